// Standalone fake site for running navprobe locally

use std::net::SocketAddr;
use tracing::{Level, info};

include!("../../tests/test_server_app.rs");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let app = create_app().await;

    // Parse port from args or use default
    let port: u16 = std::env::args()
        .nth(1)
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Test site listening on http://{}", addr);
    info!("Try: BASE_URL=http://{} navprobe run", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
