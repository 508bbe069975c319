//! Application state for dependency injection.

use tokio_util::sync::{CancellationToken, DropGuard};

use crate::app::Application;
use crate::infra::Database;
use crate::observability::PrometheusMetrics;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub app: Application,
    pub db: Option<Database>,
    pub metrics: Option<PrometheusMetrics>,
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(app: Application, shutdown: CancellationToken) -> Self {
        Self {
            app,
            db: None,
            metrics: None,
            shutdown,
        }
    }

    pub fn with_database(mut self, db: Database) -> Self {
        self.db = Some(db);
        self
    }

    pub fn with_metrics(mut self, metrics: Option<PrometheusMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Token for a single request.
    ///
    /// Cancelled on shutdown, or when the returned guard drops because axum
    /// abandoned the request future.
    pub fn request_context(&self) -> (CancellationToken, DropGuard) {
        let ctx = self.shutdown.child_token();
        let guard = ctx.clone().drop_guard();
        (ctx, guard)
    }
}
