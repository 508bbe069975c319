//! Handler contract and the decorator pipeline wrapped around every handler.
//!
//! Decoration order is fixed: metrics (outermost), then logging, then the
//! handler itself. A decorated handler has the same input, output and error
//! as the bare one; decorators only observe.

mod logging;
mod metrics;

use std::any::type_name;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use common::AppResult;

pub use self::logging::LoggingDecorator;
pub use self::metrics::{FacadeMetrics, HandlerEvent, MetricsClient, MetricsDecorator, NoopMetrics};

/// A one-shot command or query handler.
#[async_trait]
pub trait Handler<I, O>: Send + Sync {
    async fn handle(&self, ctx: &CancellationToken, input: I) -> AppResult<O>;
}

/// Handler that changes state and returns nothing
pub type CommandHandler<C> = Arc<dyn Handler<C, ()>>;

/// Handler that reads state
pub type QueryHandler<Q, R> = Arc<dyn Handler<Q, R>>;

/// Wrap `handler` as metrics(logging(handler)).
pub fn apply_decorators<I, O, H>(handler: H, metrics: Arc<dyn MetricsClient>) -> Arc<dyn Handler<I, O>>
where
    I: std::fmt::Debug + Send + 'static,
    O: Send + 'static,
    H: Handler<I, O> + 'static,
{
    let action = action_name::<I>();
    let logged = LoggingDecorator::new(Arc::new(handler), action);
    Arc::new(MetricsDecorator::new(Arc::new(logged), metrics, action))
}

/// Short type name of the handler input, e.g. `RegisterUser`.
pub fn action_name<I>() -> &'static str {
    let full = type_name::<I>();
    full.rsplit("::").next().unwrap_or(full)
}
