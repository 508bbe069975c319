//! HTTP port.

mod extractors;
mod handlers;
mod health;
mod state;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use tower_http::trace::TraceLayer;

pub use handlers::{LoginRequest, RegisterRequest, TokenResponse};
pub use state::AppState;

use self::handlers::user_routes;
use self::health::health_routes;

/// Create the main router with all routes.
///
/// `metrics_path` is only routed when the state carries a Prometheus handle.
pub fn create_router(state: AppState, metrics_path: &str) -> Router {
    let mut router = Router::new()
        .nest("/health", health_routes())
        .merge(user_routes());

    if state.metrics.is_some() {
        router = router.route(metrics_path, get(metrics_handler));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    state
        .metrics
        .map(|metrics| metrics.render())
        .unwrap_or_default()
}
