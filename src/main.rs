use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

mod config;
mod discover;
mod error;
mod extract;
mod http;
mod image;
mod models;
mod pipeline;
mod sources;
mod timestamps;
mod urls;

use config::Config;
use error::FetchError;
use http::HttpClient;
use models::LatestQuery;
use pipeline::Pipeline;
use sources::{SourceId, Sources};

const MAX_LIMIT: usize = 100;

#[derive(Clone)]
struct AppState {
    pipeline: Arc<Pipeline>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(?config, "Loaded configuration");

    let http = match HttpClient::new(&config) {
        Ok(http) => http,
        Err(e) => {
            tracing::error!(error = %e, "Could not build HTTP client");
            std::process::exit(1);
        }
    };

    let state = AppState {
        pipeline: Arc::new(Pipeline::new(Sources::new(http), config.fetch_concurrency)),
    };

    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %config.bind_addr, error = %e, "Could not bind");
            std::process::exit(1);
        }
    };
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("listening on {}", addr);
    }
    if let Err(e) = axum::serve(listener, app(state)).await {
        tracing::error!(error = %e, "Server stopped");
    }
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/:source/latest", get(latest_endpoint))
        .with_state(state)
}

async fn root() -> impl IntoResponse {
    let endpoints: serde_json::Map<String, serde_json::Value> = SourceId::ALL
        .iter()
        .map(|id| (id.as_str().to_string(), json!(format!("/{}/latest", id))))
        .collect();
    Json(json!({
        "message": "Hynews API is running!",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": endpoints,
    }))
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn latest_endpoint(
    State(state): State<AppState>,
    Path(source): Path<String>,
    Query(query): Query<LatestQuery>,
) -> Response {
    let id: SourceId = match source.parse() {
        Ok(id) => id,
        Err(e) => return error_response(StatusCode::NOT_FOUND, e.to_string()),
    };

    let limit = match query.limit {
        Some(l) if l == 0 || l > MAX_LIMIT => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("limit must be between 1 and {}", MAX_LIMIT),
            )
        }
        Some(l) => Some(l),
        None => id.default_limit(),
    };

    match state.pipeline.fetch_latest(id, limit).await {
        Ok(articles) => (StatusCode::OK, Json(articles)).into_response(),
        Err(e) => {
            tracing::error!(source = %id, error = %e, "Discovery failed");
            let detail = match &e {
                FetchError::Upstream(_) => {
                    format!("Upstream {} returned an error", id.display_name())
                }
                FetchError::NotHtml | FetchError::InvalidJson(_) => {
                    format!("Upstream {} returned an unreadable response", id.display_name())
                }
                FetchError::Request(msg) => {
                    format!("Failed to reach {}: {}", id.display_name(), msg)
                }
            };
            error_response(StatusCode::BAD_GATEWAY, detail)
        }
    }
}

fn error_response(status: StatusCode, detail: String) -> Response {
    (status, Json(json!({"detail": detail}))).into_response()
}
