//! Proxy API server for Rabbithole.
//!
//! Two thin endpoints forward requests to the external search provider and
//! reshape its response into the local result type:
//!
//! - `POST /api/search` — body `{query}` → `{results}` or `500 {error}`
//! - `POST /api/find-similar` — body `{url}` → `{results}`, `400 {error}`
//!   when the url is missing, or `500 {error}` on provider failure
//!
//! Provider failures are logged here and reported to the caller as an opaque
//! static message. No retry, no partial results.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use rabbithole_core::SearchResult;
use rabbithole_provider::ExaClient;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Listen address for the proxy server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3030,
        }
    }
}

/// Shared state for the axum handlers: just the injected provider client.
#[derive(Clone)]
struct AppState {
    client: Arc<ExaClient>,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    query: String,
}

#[derive(Debug, Deserialize)]
struct FindSimilarBody {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Serialize)]
struct ResultsBody {
    results: Vec<SearchResult>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// Build the application router around an injected provider client.
pub fn router(client: Arc<ExaClient>) -> Router {
    Router::new()
        .route("/api/search", post(handle_search))
        .route("/api/find-similar", post(handle_find_similar))
        .with_state(AppState { client })
}

async fn handle_search(State(state): State<AppState>, Json(body): Json<SearchBody>) -> Response {
    // Empty/missing queries pass through; the provider may reject them.
    match state.client.search(&body.query).await {
        Ok(results) => (StatusCode::OK, Json(ResultsBody { results })).into_response(),
        Err(e) => {
            error!("Search error: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "Failed to perform search",
                }),
            )
                .into_response()
        }
    }
}

async fn handle_find_similar(
    State(state): State<AppState>,
    Json(body): Json<FindSimilarBody>,
) -> Response {
    if body.url.trim().is_empty() {
        // Rejected before any network call is attempted.
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: "URL is required",
            }),
        )
            .into_response();
    }

    match state.client.find_similar(&body.url).await {
        Ok(results) => (StatusCode::OK, Json(ResultsBody { results })).into_response(),
        Err(e) => {
            error!("Find similar error: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "Failed to find similar content",
                }),
            )
                .into_response()
        }
    }
}

/// The running proxy server.
///
/// Binds at startup, serves from a background task, and aborts that task on
/// [`ApiServer::shutdown`] or drop.
pub struct ApiServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ApiServer {
    /// Bind `{config.host}:{config.port}` (port 0 auto-assigns) and begin
    /// serving in a background tokio task.
    pub async fn start(client: Arc<ExaClient>, config: &ServerConfig) -> Result<Self, ServerError> {
        let app = router(client);

        let bind_addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: bind_addr,
                source,
            })?;
        let addr = listener.local_addr()?;

        info!("Proxy server listening on http://{addr}");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!("Proxy server error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
