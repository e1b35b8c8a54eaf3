//! Read-only JSON API over the cache.
//!
//! `GET /` serves the cached forecasts and never waits for a rebuild; an
//! empty cache answers 500 straight away while the refresher fills it.
//! `GET /health` reports whether a snapshot is available without triggering
//! a rebuild.

use crate::core::cache::CacheStore;
use crate::utils::error::PollenError;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// IMF-fixdate, the format HTTP uses for `Last-Modified`.
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Seconds a client should wait after hitting an empty cache.
const RETRY_AFTER_SECS: &str = "5";

pub fn router(store: Arc<CacheStore>) -> Router {
    Router::new()
        .route("/", get(forecasts_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

pub fn http_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format(HTTP_DATE_FORMAT).to_string()
}

async fn forecasts_handler(State(store): State<Arc<CacheStore>>) -> Response {
    match store.read().await {
        Ok(snapshot) => (
            [(header::LAST_MODIFIED, http_date(snapshot.captured_at()))],
            Json(snapshot.records()),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// Transient failures tell the client when to come back.
fn error_response(e: &PollenError) -> Response {
    if e.is_transient() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::RETRY_AFTER, RETRY_AFTER_SECS)],
            e.to_string(),
        )
            .into_response();
    }
    tracing::error!(error = %e, "Unexpected cache read failure");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_rebuild: Option<DateTime<Utc>>,
}

async fn health_handler(State(store): State<Arc<CacheStore>>) -> (StatusCode, Json<HealthResponse>) {
    match store.peek().await {
        Some(snapshot) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                records: snapshot.len(),
                last_rebuild: Some(snapshot.captured_at()),
            }),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "warming",
                records: 0,
                last_rebuild: None,
            }),
        ),
    }
}
