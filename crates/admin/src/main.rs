use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use admin::routes::configure_routes;
use admin::shared::{config, data, logger};
use admin::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_dir = std::path::Path::new("target").join("logs");
    logger::init(&log_dir)?;

    let config = config::load_config()?;
    let data = data::connect(&config.data_service)?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let app = configure_routes(AppState::new(Arc::new(config), data));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Catalog admin listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
