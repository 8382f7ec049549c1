//! boardcast-web - HTTP layer for the boardcast proxy
//!
//! REST routes for card/board mutations, the cached list read, webhook
//! ingress, and the SSE push channel.

pub mod router;
pub mod sse;

pub use router::create_router;

use anyhow::Result;
use boardcast_core::Gateway;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Run the web server
pub async fn run(gateway: Arc<Gateway>, port: u16) -> Result<()> {
    let router = create_router(gateway);

    // Webhook deliveries come from outside, so bind all interfaces.
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    info!("boardcast listening on http://{}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
