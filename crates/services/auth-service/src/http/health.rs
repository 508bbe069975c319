//! Health check handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;

use super::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<ServiceHealth>,
}

/// Dependency health with optional error message.
#[derive(Debug, Serialize)]
pub struct ServiceHealth {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

/// Liveness plus database connectivity when a database is attached.
pub async fn health_check(State(state): State<AppState>) -> Response {
    let database = match &state.db {
        Some(db) => Some(match db.ping().await {
            Ok(()) => ServiceHealth {
                status: "healthy",
                error: None,
            },
            Err(e) => ServiceHealth {
                status: "unhealthy",
                error: Some(e.to_string()),
            },
        }),
        None => None,
    };

    let healthy = database.as_ref().map_or(true, |d| d.error.is_none());
    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" },
        database,
    };

    if healthy {
        (StatusCode::OK, Json(response)).into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response)).into_response()
    }
}
