//! Shared drive loop for consumer-style operators.
//!
//! A consumer repeatedly takes items off its input channel, hands them to
//! the variant's `process_item`, and runs `after_items` once the stream
//! ends: upstream exhaustion, an early stop from `process_item`, a stop
//! notification from its successor, or cancellation. Every path then
//! closes the output and notifies the stop target through
//! [`OperatorBase::finish`](crate::operator::OperatorBase::finish).

use async_trait::async_trait;
use driftq_common::Item;

use crate::context::ExecutionContext;
use crate::operator::{Operator, StopReceiver};

/// Consumer-style operator hooks driven by [`run_consumer`].
#[async_trait]
pub trait Consumer: Operator {
    /// Handle one upstream item. Returning false stops consumption early.
    async fn process_item(&mut self, item: Item, ctx: &ExecutionContext) -> bool;

    /// Runs exactly once after consumption stops, before shutdown.
    /// Batching consumers flush their remaining partial batch here.
    async fn after_items(&mut self, ctx: &ExecutionContext);
}

/// Drive a consumer to completion, honoring the operator lifecycle contract.
pub async fn run_consumer<C>(op: &mut C, ctx: &ExecutionContext)
where
    C: Consumer + ?Sized,
{
    if !op.base_mut().begin() {
        return;
    }
    let input = op.base_mut().take_input();
    let mut stop_rx = op.base_mut().take_stop_wait();

    if let Some(mut input) = input {
        loop {
            let next = tokio::select! {
                _ = ctx.cancelled() => None,
                _ = recv_stop(&mut stop_rx) => None,
                item = input.recv() => item,
            };
            let Some(item) = next else { break };
            if ctx.is_done() || !op.process_item(item, ctx).await {
                break;
            }
        }
    }

    op.after_items(ctx).await;
    op.base_mut().finish();
}

async fn recv_stop(stop_rx: &mut Option<StopReceiver>) {
    match stop_rx {
        Some(stop_rx) => {
            let _ = stop_rx.recv().await;
        }
        None => std::future::pending().await,
    }
}
