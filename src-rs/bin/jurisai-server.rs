use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use jurisai_rs::api::server::ApiServer;
use jurisai_rs::config::ServiceConfig;
use jurisai_rs::executor::BriefingExecutor;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServiceConfig::from_env();
    let server = ApiServer::new(&config, Arc::new(BriefingExecutor));
    tracing::info!(port = config.port, "jurisai server starting");
    if let Err(err) = server.start().await {
        tracing::error!(%err, "server error");
    }
}
