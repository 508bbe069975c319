//! Metrics decorator and sinks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metrics::{counter, histogram};
use tokio_util::sync::CancellationToken;

use common::AppResult;

use super::Handler;

/// One finished handler call.
#[derive(Debug, Clone)]
pub struct HandlerEvent<'a> {
    pub action: &'a str,
    pub success: bool,
    pub error_code: Option<&'static str>,
    pub elapsed: Duration,
}

impl HandlerEvent<'_> {
    pub fn outcome(&self) -> &'static str {
        if self.success {
            "success"
        } else {
            "failure"
        }
    }
}

/// Sink for handler events.
pub trait MetricsClient: Send + Sync {
    fn record(&self, event: &HandlerEvent<'_>);
}

/// Writes to whatever recorder the `metrics` facade has installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FacadeMetrics;

impl MetricsClient for FacadeMetrics {
    fn record(&self, event: &HandlerEvent<'_>) {
        let labels = [
            ("handler", event.action.to_string()),
            ("outcome", event.outcome().to_string()),
        ];

        counter!("auth_handler_calls_total", &labels).increment(1);
        histogram!("auth_handler_duration_seconds", &labels).record(event.elapsed.as_secs_f64());

        if let Some(code) = event.error_code {
            counter!(
                "auth_handler_errors_total",
                "handler" => event.action.to_string(),
                "code" => code
            )
            .increment(1);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsClient for NoopMetrics {
    fn record(&self, _event: &HandlerEvent<'_>) {}
}

/// Counts calls and records latency per handler and outcome.
pub struct MetricsDecorator<I, O> {
    inner: Arc<dyn Handler<I, O>>,
    client: Arc<dyn MetricsClient>,
    action: &'static str,
}

impl<I, O> MetricsDecorator<I, O> {
    pub fn new(
        inner: Arc<dyn Handler<I, O>>,
        client: Arc<dyn MetricsClient>,
        action: &'static str,
    ) -> Self {
        Self {
            inner,
            client,
            action,
        }
    }
}

#[async_trait]
impl<I, O> Handler<I, O> for MetricsDecorator<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    async fn handle(&self, ctx: &CancellationToken, input: I) -> AppResult<O> {
        let start = Instant::now();
        let result = self.inner.handle(ctx, input).await;

        self.client.record(&HandlerEvent {
            action: self.action,
            success: result.is_ok(),
            error_code: result.as_ref().err().map(|e| e.code()),
            elapsed: start.elapsed(),
        });

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_label() {
        let mut event = HandlerEvent {
            action: "LoginUser",
            success: true,
            error_code: None,
            elapsed: Duration::from_millis(3),
        };
        assert_eq!(event.outcome(), "success");

        event.success = false;
        event.error_code = Some("INVALID_CREDENTIALS");
        assert_eq!(event.outcome(), "failure");
    }

    #[test]
    fn test_facade_without_recorder_is_harmless() {
        FacadeMetrics.record(&HandlerEvent {
            action: "GetUser",
            success: false,
            error_code: Some("USER_NOT_FOUND"),
            elapsed: Duration::ZERO,
        });
    }
}
