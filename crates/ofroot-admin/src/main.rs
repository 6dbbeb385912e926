use std::{net::SocketAddr, sync::Arc};

use anyhow::Result as AnyResult;
use ofroot_admin::{AppState, InvoiceActions, router};
use ofroot_platform::{HttpInvoiceApi, InvoiceApi, ServiceConfig};
use ofroot_sandbox::InMemoryInvoiceApi;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "ofroot_admin=info".to_string()),
        )
        .init();

    let config = ServiceConfig::from_env("0.0.0.0:8080")?;
    let api: Arc<dyn InvoiceApi> = match config.api_client_config() {
        Some(client_config) => {
            let client = HttpInvoiceApi::new(client_config)?;
            info!("forwarding invoice actions to {}", client.base_url());
            Arc::new(client)
        }
        None => {
            warn!("OFROOT_API_BASE_URL is not set; using the in-memory sandbox");
            Arc::new(InMemoryInvoiceApi::new())
        }
    };

    let state = AppState::new(InvoiceActions::new(api), &config.session_cookie);
    let router = router(state);

    let addr: SocketAddr = config.http_addr.parse()?;
    info!("admin actions listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
