use crate::error::ClientError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// One endpoint from the identity service's catalog.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub service_type: String,
    pub url: String,
    pub region: Option<String>,
}

/// A client for the identity/service-catalog service.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Catalog endpoints registered for `service_type` (empty when the
    /// service is not in the catalog).
    async fn endpoints(&self, service_type: &str) -> Result<Vec<Endpoint>, ClientError>;
}

/// Acquires identity clients. Called at most once per polling cycle, via
/// [`CachedSession`].
#[async_trait]
pub trait IdentityClientProvider: Send + Sync {
    async fn acquire(&self) -> Result<Arc<dyn IdentityClient>, ClientError>;
}

enum SessionState {
    Unresolved,
    Resolved(Arc<dyn IdentityClient>),
    Failed(ClientError),
}

/// Per-cycle identity-client cache with negative caching.
///
/// Reset to `Unresolved` at the start of every polling-task invocation.
/// The first access within a cycle attempts acquisition once; every later
/// access returns the cached client or re-raises the cached error. This
/// bounds identity-service load to one attempt per interval no matter how
/// many plugins need a client, and a transient outage is not hammered
/// dozens of times within one cycle.
pub struct CachedSession {
    provider: Arc<dyn IdentityClientProvider>,
    state: Mutex<SessionState>,
}

impl CachedSession {
    pub fn new(provider: Arc<dyn IdentityClientProvider>) -> Self {
        Self {
            provider,
            state: Mutex::new(SessionState::Unresolved),
        }
    }

    /// Forgets the cached outcome. Called at cycle start; the next
    /// [`client`](Self::client) call attempts acquisition again.
    pub async fn reset(&self) {
        *self.state.lock().await = SessionState::Unresolved;
    }

    /// Returns the cycle's identity client, acquiring it on first use.
    ///
    /// # Errors
    ///
    /// Re-raises the acquisition error cached for this cycle.
    pub async fn client(&self) -> Result<Arc<dyn IdentityClient>, ClientError> {
        let mut state = self.state.lock().await;
        match &*state {
            SessionState::Resolved(client) => Ok(client.clone()),
            SessionState::Failed(e) => Err(e.clone()),
            SessionState::Unresolved => match self.provider.acquire().await {
                Ok(client) => {
                    *state = SessionState::Resolved(client.clone());
                    Ok(client)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "identity client acquisition failed; cached for this cycle");
                    *state = SessionState::Failed(e.clone());
                    Err(e)
                }
            },
        }
    }
}
