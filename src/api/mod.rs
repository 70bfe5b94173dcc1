//! HTTP query surface
//!
//! Three read-only endpoints:
//! - `GET /dump`: the full crawl state as JSON
//! - `GET /search?q=`: the ten best index hits
//! - `GET /stats`: index counters plus host and version

use crate::crawler::Coordinator;
use crate::index::{IndexStats, MemoryIndex, SearchHit};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// Number of hits `/search` returns
pub const SEARCH_LIMIT: usize = 10;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
    pub index: Arc<MemoryIndex>,

    /// Server start time
    pub started: Instant,
}

impl AppState {
    pub fn new(coordinator: Arc<Coordinator>, index: Arc<MemoryIndex>) -> Self {
        Self {
            coordinator,
            index,
            started: Instant::now(),
        }
    }
}

/// Simple error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchResponse {
    pub query: String,
    pub total: usize,
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatsResponse {
    pub index: IndexStats,
    pub doc_count: usize,
    pub pages: usize,
    pub seeds: usize,
    pub hostname: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/dump", get(dump))
        .route("/search", get(search))
        .route("/stats", get(stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves `router` on `addr` until the listener fails
pub async fn serve(addr: SocketAddr, router: Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Serving API on {}", listener.local_addr()?);
    axum::serve(listener, router).await
}

async fn dump(State(state): State<AppState>) -> Response {
    match state.coordinator.to_json() {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => {
            tracing::error!("Failed to serialize dump: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to serialize crawl state")),
            )
                .into_response()
        }
    }
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let query = match params.q {
        Some(q) if !q.trim().is_empty() => q,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Missing query")),
            )
                .into_response();
        }
    };

    tracing::debug!("Search {}", query);
    let hits = state.index.search(&query, SEARCH_LIMIT);
    Json(SearchResponse {
        query,
        total: hits.len(),
        hits,
    })
    .into_response()
}

async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    let index = state.index.stats();
    let store = state.coordinator.store();

    Json(StatsResponse {
        index,
        doc_count: index.documents,
        pages: store.page_count(),
        seeds: store.seed_count(),
        hostname: hostname(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started.elapsed().as_secs(),
    })
}

fn hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .filter(|name| !name.is_empty())
        .or_else(|| {
            std::fs::read_to_string("/proc/sys/kernel/hostname")
                .ok()
                .map(|name| name.trim().to_string())
        })
        .unwrap_or_default()
}
