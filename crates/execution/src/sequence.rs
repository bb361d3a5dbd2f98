//! Linear composition of child operators into one pipelined stage chain.

use async_trait::async_trait;
use driftq_common::{Item, PipelineConfig, Result};

use crate::context::ExecutionContext;
use crate::operator::{BoxedOperator, Operator, OperatorBase};
use crate::visitor::Visitor;

/// Runs N children as one logical operator, pipelining items strictly
/// producer-to-consumer left to right.
///
/// Wiring, performed once inside `run_once`:
/// - the head child reads the sequence's own input and notifies the
///   sequence when it terminates;
/// - every later child reads its predecessor's output and notifies that
///   predecessor when it terminates, so early shutdown propagates upstream
///   one hop at a time;
/// - the tail child sends onto the sequence's own output, making the
///   sequence transparent to whatever consumes it.
///
/// Each child then runs on its own task. The sequence waits for the head's
/// stop notification, closes its own output handle, and notifies its stop
/// target, recursively satisfying the operator contract for arbitrarily
/// nested sequences.
pub struct Sequence {
    base: OperatorBase,
    children: Vec<BoxedOperator>,
}

impl Sequence {
    /// Compose `children` into a linear chain.
    pub fn new(children: Vec<BoxedOperator>, config: &PipelineConfig) -> Self {
        Self {
            base: OperatorBase::new(config.channel_capacity),
            children,
        }
    }

    /// Child operators, head first. Empty once the sequence has run.
    pub fn children(&self) -> &[BoxedOperator] {
        &self.children
    }
}

#[async_trait]
impl Operator for Sequence {
    fn accept(&self, visitor: &mut dyn Visitor) -> Result<()> {
        visitor.visit_sequence(self)
    }

    fn boxed_copy(&self) -> BoxedOperator {
        Box::new(Self {
            base: self.base.fresh(),
            children: self.children.iter().map(|c| c.boxed_copy()).collect(),
        })
    }

    fn base(&self) -> &OperatorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut OperatorBase {
        &mut self.base
    }

    async fn run_once(&mut self, ctx: &ExecutionContext, parent: Option<Item>) {
        if !self.base.begin() {
            return;
        }
        let mut children = std::mem::take(&mut self.children);
        if children.is_empty() {
            // Degenerate chain: nothing to forward, complete immediately.
            self.base.finish();
            return;
        }

        if let Some(input) = self.base.take_input() {
            children[0].set_input(input);
        }
        children[0].set_stop(self.base.stop_handle());

        for i in 1..children.len() {
            let upstream_output = children[i - 1].take_output();
            let upstream_stop = children[i - 1].stop_handle();
            if let Some(output) = upstream_output {
                children[i].set_input(output);
            }
            children[i].set_stop(upstream_stop);
        }

        if let (Some(output), Some(tail)) = (self.base.output_clone(), children.last_mut()) {
            tail.set_output(output);
        }

        tracing::debug!(
            query_id = %ctx.query_id(),
            operator = "Sequence",
            children = children.len(),
            "launching pipeline stages"
        );
        for mut child in children {
            let ctx = ctx.clone();
            let parent = parent.clone();
            tokio::spawn(async move {
                child.run_once(&ctx, parent).await;
            });
        }

        // Wait for the head of the chain to report termination; the tail
        // keeps its own handle onto our output until it drains.
        tokio::select! {
            _ = ctx.cancelled() => {}
            _ = self.base.wait_stopped() => {}
        }
        self.base.finish();
    }
}
