mod config;
mod discoveries;
mod identity;
mod plugins;
mod pollsters;

use anyhow::Result;
use meterd_polling::manager::AgentManager;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/agent.toml".to_string());

    let cfg = config::AgentConfig::load(&config_path)?;
    init_logging(&cfg);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        instance_id = %cfg.agent.instance_id,
        "meterd-agent starting"
    );

    let polling_cfg = cfg.polling_config();
    // Structural misconfiguration is checked before any plugin loads.
    AgentManager::validate(&polling_cfg)?;

    let (pollsters, discoveries) = plugins::load_registries(&polling_cfg);
    let notifier = meterd_notify::build_notifier(&cfg.publisher.url)?;
    let provider = Arc::new(identity::StaticCatalogProvider::from_config(&cfg.identity));

    let mut manager = AgentManager::new(polling_cfg, pollsters, discoveries, provider, notifier)?;
    manager.start().await?;

    signal::ctrl_c().await?;
    tracing::info!("shutdown signal received, draining in-flight polls");
    manager.stop().await;

    Ok(())
}

fn init_logging(cfg: &config::AgentConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.agent.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
