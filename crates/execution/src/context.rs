//! Per-query shared execution context.
//!
//! One context is created per pipeline run and cloned into every operator
//! task. It carries the fatal-error and warning sinks, cancellation and
//! deadline state, and the ambient [`PipelineConfig`]. The structure is
//! fixed at construction; only channel content flows afterwards.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use driftq_common::{DriftqError, PipelineConfig, QueryId};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

struct ContextInner {
    query_id: QueryId,
    config: PipelineConfig,
    errors: mpsc::UnboundedSender<DriftqError>,
    warnings: mpsc::UnboundedSender<DriftqError>,
    cancel: CancellationToken,
    deadline: Option<Instant>,
    failed: AtomicBool,
}

/// Shared execution context, cheap to clone into operator tasks.
#[derive(Clone)]
pub struct ExecutionContext {
    inner: Arc<ContextInner>,
}

/// Receiver halves of the context's diagnostic channels, kept by the caller.
pub struct ContextSignals {
    /// Fatal pipeline errors; the first value observed aborts the caller's
    /// interpretation of results.
    pub errors: mpsc::UnboundedReceiver<DriftqError>,
    /// Per-item, non-fatal diagnostics.
    pub warnings: mpsc::UnboundedReceiver<DriftqError>,
}

impl ExecutionContext {
    /// Build a context and the caller-held receiver halves of its channels.
    pub fn new(config: PipelineConfig, query_id: QueryId) -> (Self, ContextSignals) {
        let (errors_tx, errors_rx) = mpsc::unbounded_channel();
        let (warnings_tx, warnings_rx) = mpsc::unbounded_channel();
        let deadline = config
            .timeout_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms));
        let ctx = Self {
            inner: Arc::new(ContextInner {
                query_id,
                config,
                errors: errors_tx,
                warnings: warnings_tx,
                cancel: CancellationToken::new(),
                deadline,
                failed: AtomicBool::new(false),
            }),
        };
        (
            ctx,
            ContextSignals {
                errors: errors_rx,
                warnings: warnings_rx,
            },
        )
    }

    /// Identifier of the query execution this context belongs to.
    pub fn query_id(&self) -> QueryId {
        self.inner.query_id
    }

    /// Ambient configuration fixed at construction.
    pub fn config(&self) -> &PipelineConfig {
        &self.inner.config
    }

    /// Report a fatal pipeline error.
    ///
    /// Records the failure and wakes every operator blocked on
    /// [`ExecutionContext::cancelled`]; the emitting operator is expected to
    /// stop on its normal shutdown path.
    pub fn fatal(&self, err: DriftqError) {
        tracing::error!(query_id = %self.inner.query_id, error = %err, "fatal pipeline error");
        self.inner.failed.store(true, Ordering::SeqCst);
        let _ = self.inner.errors.send(err);
        self.inner.cancel.cancel();
    }

    /// Report a per-item, non-fatal warning. The pipeline keeps running.
    pub fn warn(&self, err: DriftqError) {
        tracing::debug!(query_id = %self.inner.query_id, warning = %err, "pipeline warning");
        let _ = self.inner.warnings.send(err);
    }

    /// Request cooperative shutdown of every operator in the pipeline.
    pub fn cancel(&self) {
        self.inner.cancel.cancel();
    }

    /// True once a fatal error has been reported.
    pub fn has_failed(&self) -> bool {
        self.inner.failed.load(Ordering::SeqCst)
    }

    /// True once shutdown was requested, whether by [`ExecutionContext::cancel`],
    /// a fatal error, or deadline expiry.
    pub fn is_done(&self) -> bool {
        self.inner.cancel.is_cancelled() || self.deadline_expired()
    }

    /// Resolve when shutdown is requested or the deadline expires.
    ///
    /// Cancel-safe; operators select on this alongside their channel
    /// operations at every item-processing step.
    pub async fn cancelled(&self) {
        match self.inner.deadline {
            Some(deadline) => tokio::select! {
                _ = self.inner.cancel.cancelled() => {}
                _ = tokio::time::sleep_until(deadline) => {}
            },
            None => self.inner.cancel.cancelled().await,
        }
    }

    fn deadline_expired(&self) -> bool {
        self.inner
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }
}

#[cfg(test)]
mod tests {
    use driftq_common::{DriftqError, PipelineConfig, QueryId};

    use super::ExecutionContext;

    #[tokio::test]
    async fn fatal_records_failure_and_requests_shutdown() {
        let (ctx, mut signals) = ExecutionContext::new(PipelineConfig::default(), QueryId(1));
        assert!(!ctx.has_failed());
        assert!(!ctx.is_done());

        ctx.fatal(DriftqError::Storage("bulk call failed".to_string()));
        assert!(ctx.has_failed());
        assert!(ctx.is_done());
        ctx.cancelled().await;

        let err = signals.errors.recv().await.expect("one fatal error");
        assert!(err.to_string().contains("bulk call failed"));
    }

    #[tokio::test]
    async fn warnings_do_not_stop_the_pipeline() {
        let (ctx, mut signals) = ExecutionContext::new(PipelineConfig::default(), QueryId(2));
        ctx.warn(DriftqError::Evaluation("non-string key".to_string()));

        assert!(!ctx.has_failed());
        assert!(!ctx.is_done());
        let warning = signals.warnings.recv().await.expect("one warning");
        assert!(warning.to_string().contains("non-string key"));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_expiry_reads_as_done_without_failure() {
        let config = PipelineConfig {
            timeout_ms: Some(5),
            ..PipelineConfig::default()
        };
        let (ctx, _signals) = ExecutionContext::new(config, QueryId(3));
        assert!(!ctx.is_done());

        tokio::time::advance(std::time::Duration::from_millis(10)).await;
        ctx.cancelled().await;
        assert!(ctx.is_done());
        assert!(!ctx.has_failed());
    }

    #[tokio::test]
    async fn cancellation_is_distinguishable_from_failure() {
        let (ctx, _signals) = ExecutionContext::new(PipelineConfig::default(), QueryId(4));
        ctx.cancel();
        assert!(ctx.is_done());
        assert!(!ctx.has_failed());
    }
}
