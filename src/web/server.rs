//! Admin web server using Axum.

use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};

use super::router::create_app_router;
use super::AdminState;
use crate::error::{Error, Result};

/// Web server configuration.
pub struct WebServerConfig {
    pub port: u16,
    pub host: String,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self {
            port: 3333,
            host: "127.0.0.1".to_string(),
        }
    }
}

/// Run the admin server until the process exits.
pub async fn run_server(config: WebServerConfig, state: AdminState) -> Result<()> {
    let app = create_app_router(state).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| Error::Web(format!("Invalid address: {}", e)))?;

    tracing::info!("Starting admin server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
