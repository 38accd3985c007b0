use crate::config::IdentitySection;
use async_trait::async_trait;
use meterd_polling::error::ClientError;
use meterd_polling::identity::{Endpoint, IdentityClient, IdentityClientProvider};
use std::sync::Arc;

/// Identity client backed by the statically configured service catalog.
struct StaticCatalog {
    endpoints: Vec<Endpoint>,
}

#[async_trait]
impl IdentityClient for StaticCatalog {
    async fn endpoints(&self, service_type: &str) -> Result<Vec<Endpoint>, ClientError> {
        Ok(self
            .endpoints
            .iter()
            .filter(|e| e.service_type == service_type)
            .cloned()
            .collect())
    }
}

/// Provider handing out [`StaticCatalog`] clients built from the
/// `[identity]` config section. Acquisition fails when no endpoints are
/// configured, which exercises the per-cycle negative cache the same way
/// a real identity outage would.
pub struct StaticCatalogProvider {
    endpoints: Vec<Endpoint>,
}

impl StaticCatalogProvider {
    pub fn from_config(section: &IdentitySection) -> Self {
        Self {
            endpoints: section
                .endpoints
                .iter()
                .map(|e| Endpoint {
                    service_type: e.service_type.clone(),
                    url: e.url.clone(),
                    region: e.region.clone(),
                })
                .collect(),
        }
    }
}

#[async_trait]
impl IdentityClientProvider for StaticCatalogProvider {
    async fn acquire(&self) -> Result<Arc<dyn IdentityClient>, ClientError> {
        if self.endpoints.is_empty() {
            return Err(ClientError::Unconfigured(
                "no [identity] endpoints configured".to_string(),
            ));
        }
        Ok(Arc::new(StaticCatalog {
            endpoints: self.endpoints.clone(),
        }))
    }
}
