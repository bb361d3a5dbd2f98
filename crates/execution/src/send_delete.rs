//! Batching delete consumer.

use std::collections::HashSet;

use async_trait::async_trait;
use driftq_common::{DriftqError, Item, Result};
use serde_json::{json, Value};

use crate::consumer::{run_consumer, Consumer};
use crate::context::ExecutionContext;
use crate::operator::{BoxedOperator, Operator, OperatorBase};
use crate::plan::SendDeletePlan;
use crate::visitor::Visitor;

/// Accumulates items into a bounded batch and performs one bulk delete per
/// flush. Only items whose keys the store reports removed are forwarded,
/// annotated with the removed key under the `meta` attachment.
pub struct SendDelete {
    base: OperatorBase,
    plan: SendDeletePlan,
}

impl SendDelete {
    /// Build a delete consumer from its plan node.
    pub fn new(plan: SendDeletePlan, config: &driftq_common::PipelineConfig) -> Self {
        Self {
            base: OperatorBase::new(config.channel_capacity),
            plan,
        }
    }

    /// Plan-node configuration, for introspection.
    pub fn plan(&self) -> &SendDeletePlan {
        &self.plan
    }

    async fn flush_batch(&mut self, ctx: &ExecutionContext) -> bool {
        let batch = self.base.take_batch();
        if batch.is_empty() {
            return true;
        }

        let mut keyed = Vec::with_capacity(batch.len());
        for item in batch {
            match self.plan.key().evaluate(&item, ctx) {
                Ok(Value::String(key)) => keyed.push((key, item)),
                Ok(other) => ctx.warn(DriftqError::Evaluation(format!(
                    "cannot delete non-string key {other} for value {}",
                    item.value()
                ))),
                Err(e) => ctx.warn(DriftqError::Evaluation(format!(
                    "error evaluating delete key for value {}: {e}",
                    item.value()
                ))),
            }
        }
        if keyed.is_empty() {
            return true;
        }

        let keys: Vec<String> = keyed.iter().map(|(key, _)| key.clone()).collect();
        tracing::debug!(
            query_id = %ctx.query_id(),
            operator = "SendDelete",
            keyspace = self.plan.keyspace().name(),
            keys = keys.len(),
            "flushing delete batch"
        );

        let removed = match self.plan.keyspace().delete(&keys).await {
            Ok(removed) => removed,
            Err(e) => {
                ctx.fatal(e);
                return false;
            }
        };
        let removed: HashSet<String> = removed.into_iter().collect();

        for (key, mut item) in keyed {
            if !removed.contains(&key) {
                continue;
            }
            item.set_attachment("meta", json!({ "id": key }));
            if !self.base.send_item(item).await {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl Operator for SendDelete {
    fn accept(&self, visitor: &mut dyn Visitor) -> Result<()> {
        visitor.visit_send_delete(self)
    }

    fn boxed_copy(&self) -> BoxedOperator {
        Box::new(Self {
            base: self.base.fresh(),
            plan: self.plan.clone(),
        })
    }

    fn base(&self) -> &OperatorBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut OperatorBase {
        &mut self.base
    }

    async fn run_once(&mut self, ctx: &ExecutionContext, _parent: Option<Item>) {
        run_consumer(self, ctx).await;
    }
}

#[async_trait]
impl Consumer for SendDelete {
    async fn process_item(&mut self, item: Item, ctx: &ExecutionContext) -> bool {
        self.base.batch_push(item);
        if self.base.batch_len() >= self.plan.batch_size(ctx.config()) {
            self.flush_batch(ctx).await
        } else {
            true
        }
    }

    async fn after_items(&mut self, ctx: &ExecutionContext) {
        if !ctx.is_done() {
            self.flush_batch(ctx).await;
        }
    }
}
