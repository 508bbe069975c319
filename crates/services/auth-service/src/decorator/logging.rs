//! Logging decorator.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use common::AppResult;

use super::Handler;

/// Emits one span per call with entry and exit events.
///
/// The input is rendered through its `Debug` impl, so credential types must
/// redact themselves there.
pub struct LoggingDecorator<I, O> {
    inner: Arc<dyn Handler<I, O>>,
    action: &'static str,
}

impl<I, O> LoggingDecorator<I, O> {
    pub fn new(inner: Arc<dyn Handler<I, O>>, action: &'static str) -> Self {
        Self { inner, action }
    }
}

#[async_trait]
impl<I, O> Handler<I, O> for LoggingDecorator<I, O>
where
    I: fmt::Debug + Send + 'static,
    O: Send + 'static,
{
    async fn handle(&self, ctx: &CancellationToken, input: I) -> AppResult<O> {
        let span = tracing::info_span!("handler", action = self.action);

        async move {
            tracing::debug!(input = ?input, "Executing handler");
            let start = Instant::now();

            let result = self.inner.handle(ctx, input).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(_) => tracing::info!(elapsed_ms, "Handler succeeded"),
                Err(err) if err.is_internal() => {
                    tracing::error!(elapsed_ms, code = err.code(), error = ?err, "Handler failed")
                }
                Err(err) => tracing::warn!(elapsed_ms, code = err.code(), "Handler rejected input"),
            }

            result
        }
        .instrument(span)
        .await
    }
}
