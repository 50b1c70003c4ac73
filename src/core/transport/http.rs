//! HTTP transport implementation.
//!
//! One JSON-RPC message per `POST` body, so standard HTTP clients (curl,
//! browsers, etc.) can reach the server. The body goes through the same
//! decoder as a line read from a stream.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, instrument};

use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::FsServer;

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Build the router: RPC endpoint, health check, optional CORS.
    pub fn router(&self, server: FsServer) -> Router {
        let mut app = Router::new()
            .route(&self.config.rpc_path, post(handle_rpc))
            .route("/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .with_state(server);

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }
        app
    }

    /// Run the HTTP transport.
    pub async fn run(self, server: FsServer) -> TransportResult<()> {
        let addr = self.address();
        let app = self.router(server);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!(
            "Ready - listening on {} (JSON-RPC over HTTP, CORS {})",
            addr, cors_status
        );
        info!("  → JSON-RPC: POST {}", self.config.rpc_path);
        info!("  → Health:   GET /health");

        axum::serve(listener, app)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Health check endpoint.
async fn health_check(State(server): State<FsServer>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "name": server.name(),
        "version": server.version(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Handle one JSON-RPC message. Notifications get `204 No Content`.
#[instrument(skip_all)]
async fn handle_rpc(State(server): State<FsServer>, body: String) -> Response {
    match server.handle_line(&body).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => {
            debug!("Notification processed, no response");
            StatusCode::NO_CONTENT.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::core::security::SecurityPolicy;
    use crate::domains::tools::Dispatcher;
    use tempfile::TempDir;

    fn test_server() -> (TempDir, FsServer) {
        let temp_dir = TempDir::new().unwrap();
        let policy =
            SecurityPolicy::new(vec![temp_dir.path().to_path_buf()], 64, Vec::<String>::new())
                .unwrap();
        let server = FsServer::with_dispatcher(Config::default(), Dispatcher::new(policy));
        (temp_dir, server)
    }

    #[tokio::test]
    async fn test_rpc_request() {
        let (_temp_dir, server) = test_server();
        let response = handle_rpc(
            State(server),
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rpc_notification() {
        let (_temp_dir, server) = test_server();
        let response = handle_rpc(
            State(server),
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn test_router_builds() {
        let (_temp_dir, server) = test_server();
        let transport = HttpTransport::new(HttpConfig::default());
        let _router = transport.router(server);
        assert_eq!(transport.address(), "127.0.0.1:8080");
    }
}
