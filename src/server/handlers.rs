//! HTTP request handlers
//!
//! Contains handlers for all HTTP endpoints.

use std::time::Instant;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::AppState;
use crate::error::{AppError, AppResult};
use crate::transformer::formatter::CONTENT_TYPE;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Health status
    status: String,
    /// Application version
    version: String,
    /// Monitored daemon role
    role: String,
}

/// Root endpoint - displays basic info
pub async fn root(State(state): State<AppState>) -> Html<String> {
    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Hadoop {role} Exporter</title>
</head>
<body>
    <h1>Hadoop {role} Exporter</h1>
    <p>Version: {version}</p>
    <p>JMX endpoint: {url}</p>
    <ul>
        <li><a href="/health">Health Check</a></li>
        <li><a href="{path}">Metrics</a></li>
    </ul>
</body>
</html>"#,
        role = state.config.role,
        version = env!("CARGO_PKG_VERSION"),
        url = state.collector.client().url(),
        path = state.config.server.path
    );
    Html(html)
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        role: state.config.role.to_string(),
    })
}

/// Metrics endpoint - runs one collection cycle and renders the registry
///
/// A failed cycle leaves the last good values in place. With
/// `serve_stale_on_failure: false` it answers 502 instead. Overlapping
/// scrapes publish in start order, not completion order.
#[instrument(skip(state), name = "metrics_handler")]
pub async fn metrics(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let start = Instant::now();
    let cycle = state.registry.begin_cycle();

    match state.collector.collect().await {
        Ok(snapshot) => {
            let count = snapshot.len();
            let published = state
                .registry
                .publish(cycle, snapshot, start.elapsed().as_secs_f64());
            debug!(
                cycle,
                published,
                duration_ms = start.elapsed().as_millis() as u64,
                metrics_count = count,
                "Collection cycle complete"
            );
        }
        Err(e) => {
            warn!(
                cycle,
                kind = e.kind(),
                field = e.field().unwrap_or("-"),
                error = %e,
                "Collection cycle failed, keeping last known-good values"
            );
            state
                .registry
                .record_failure(cycle, &e, start.elapsed().as_secs_f64());

            if !state.config.server.serve_stale_on_failure {
                return Err(AppError::Scrape(e));
            }
        }
    }

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, CONTENT_TYPE)],
        state.registry.render(),
    ))
}
