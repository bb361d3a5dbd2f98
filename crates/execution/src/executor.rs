//! Pipeline launch facade for callers.
//!
//! Wires a caller-owned input channel to the root operator, claims the root
//! output, spawns the root on its own task, and hands back everything the
//! caller needs: the input sender, the result stream, and the diagnostic
//! channels. Dropping the input sender is how the caller signals
//! end-of-stream into the pipeline.

use driftq_common::{DriftqError, Item, PipelineConfig, QueryId, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::context::{ContextSignals, ExecutionContext};
use crate::operator::{BoxedOperator, ItemReceiver, ItemSender, Operator};

/// Handles onto one running pipeline.
pub struct PipelineHandle {
    /// Feed items into the head of the pipeline; drop to signal end-of-stream.
    pub input: ItemSender,
    /// Result items, closed when the pipeline permanently stops producing.
    pub output: ItemReceiver,
    /// Fatal errors; any value means the overall result is incomplete.
    pub errors: mpsc::UnboundedReceiver<DriftqError>,
    /// Non-fatal per-item diagnostics.
    pub warnings: mpsc::UnboundedReceiver<DriftqError>,
    /// The shared context, usable to cancel or inspect recorded state.
    pub context: ExecutionContext,
    /// The root operator's task.
    pub root: JoinHandle<()>,
}

/// Everything one pipeline run produced, as seen by the caller.
pub struct PipelineOutcome {
    /// Successfully produced/mutated items, in emission order.
    pub items: Vec<Item>,
    /// Fatal errors recorded during the run; non-empty means the item list
    /// is incomplete regardless of its length.
    pub errors: Vec<DriftqError>,
    /// Non-fatal per-item diagnostics.
    pub warnings: Vec<DriftqError>,
    /// The context, for distinguishing cancellation from natural completion.
    pub context: ExecutionContext,
}

impl PipelineHandle {
    /// Signal end-of-stream, drain the pipeline to completion, and collect
    /// its outputs and diagnostics.
    ///
    /// Callers must not hold clones of [`PipelineHandle::input`], or
    /// end-of-stream never reaches the head of the chain.
    pub async fn finish(self) -> PipelineOutcome {
        let PipelineHandle {
            input,
            mut output,
            mut errors,
            mut warnings,
            context,
            root,
        } = self;
        drop(input);

        let mut items = Vec::new();
        while let Some(item) = output.recv().await {
            items.push(item);
        }
        let _ = root.await;

        // Output closure means the tail has stopped; all diagnostics for
        // the run were sent before that point.
        let mut recorded_errors = Vec::new();
        while let Ok(err) = errors.try_recv() {
            recorded_errors.push(err);
        }
        let mut recorded_warnings = Vec::new();
        while let Ok(warning) = warnings.try_recv() {
            recorded_warnings.push(warning);
        }

        PipelineOutcome {
            items,
            errors: recorded_errors,
            warnings: recorded_warnings,
            context,
        }
    }
}

/// Start `root` under a fresh context.
///
/// # Errors
/// Fails if the root's output was already claimed, meaning the operator instance
/// was wired into some other pipeline.
pub fn launch(
    mut root: BoxedOperator,
    config: PipelineConfig,
    query_id: QueryId,
) -> Result<PipelineHandle> {
    let (input_tx, input_rx) = mpsc::channel(config.channel_capacity.max(1));
    let (ctx, ContextSignals { errors, warnings }) = ExecutionContext::new(config, query_id);

    root.set_input(input_rx);
    let output = root.take_output().ok_or_else(|| {
        DriftqError::Execution("root operator output already claimed".to_string())
    })?;

    tracing::info!(query_id = %query_id, "launching pipeline");
    let task_ctx = ctx.clone();
    let root = tokio::spawn(async move {
        root.run_once(&task_ctx, None).await;
    });

    Ok(PipelineHandle {
        input: input_tx,
        output,
        errors,
        warnings,
        context: ctx,
        root,
    })
}
