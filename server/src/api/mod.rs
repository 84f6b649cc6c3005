//! API Router and Application State
//!
//! Health check and manual audit trigger.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::audit::{trigger_audit, AuditRunner};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Audit runner shared with the scheduler
    pub runner: Arc<AuditRunner>,
}

impl AppState {
    #[must_use]
    pub const fn new(runner: Arc<AuditRunner>) -> Self {
        Self { runner }
    }
}

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/run", get(run_audit).post(run_audit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
    /// Number of audited guilds
    guilds: usize,
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        guilds: state.runner.guilds().len(),
    })
}

#[derive(Serialize)]
struct RunResponse {
    status: &'static str,
}

/// Start an audit pass without waiting for it to finish.
async fn run_audit(State(state): State<AppState>) -> (StatusCode, Json<RunResponse>) {
    let _ = trigger_audit(state.runner.clone());
    (StatusCode::ACCEPTED, Json(RunResponse { status: "started" }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::audit::AuditOptions;
    use crate::discord::DiscordClient;
    use crate::notify::Notifier;

    fn test_router() -> Router {
        // Points at a closed port; passes triggered here fail and are only logged.
        let discord = DiscordClient::new(reqwest::Client::new(), "http://127.0.0.1:9", "token");
        let runner = AuditRunner::new(
            Vec::new(),
            discord.clone(),
            Notifier::new(discord),
            AuditOptions::default(),
            true,
        );
        create_router(AppState::new(Arc::new(runner)))
    }

    async fn send(method: Method, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = test_router()
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health_check() {
        let (status, body) = send(Method::GET, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["guilds"], 0);
    }

    #[tokio::test]
    async fn test_run_returns_accepted() {
        let (status, body) = send(Method::POST, "/run").await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["status"], "started");

        let (status, _) = send(Method::GET, "/run").await;
        assert_eq!(status, StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let (status, _) = send(Method::GET, "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
