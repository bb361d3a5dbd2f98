//! Batching upsert consumer.

use async_trait::async_trait;
use driftq_common::{DriftqError, Item, Result};
use driftq_storage::Pair;
use serde_json::{json, Value};

use crate::consumer::{run_consumer, Consumer};
use crate::context::ExecutionContext;
use crate::operator::{BoxedOperator, Operator, OperatorBase};
use crate::plan::SendUpsertPlan;
use crate::visitor::Visitor;

/// Accumulates items into a bounded batch and performs one bulk upsert per
/// flush, forwarding only the items the store actually persisted, each
/// annotated with its store-assigned key under the `meta` attachment.
pub struct SendUpsert {
    base: OperatorBase,
    plan: SendUpsertPlan,
}

impl SendUpsert {
    /// Build an upsert consumer from its plan node.
    pub fn new(plan: SendUpsertPlan, config: &driftq_common::PipelineConfig) -> Self {
        Self {
            base: OperatorBase::new(config.channel_capacity),
            plan,
        }
    }

    /// Plan-node configuration, for introspection.
    pub fn plan(&self) -> &SendUpsertPlan {
        &self.plan
    }

    async fn flush_batch(&mut self, ctx: &ExecutionContext) -> bool {
        // Batch ownership transfers here, before any await on the store.
        let batch = self.base.take_batch();
        if batch.is_empty() {
            return true;
        }

        let mut pairs = Vec::with_capacity(batch.len());
        for item in batch {
            let key = match self.plan.key() {
                Some(expr) => match expr.evaluate(&item, ctx) {
                    Ok(Value::String(key)) => Some(key),
                    Ok(other) => {
                        ctx.warn(DriftqError::Evaluation(format!(
                            "cannot upsert non-string key {other} for value {}",
                            item.value()
                        )));
                        continue;
                    }
                    Err(e) => {
                        ctx.warn(DriftqError::Evaluation(format!(
                            "error evaluating upsert key for value {}: {e}",
                            item.value()
                        )));
                        continue;
                    }
                },
                None => None,
            };
            pairs.push(Pair { key, item });
        }
        if pairs.is_empty() {
            return true;
        }

        tracing::debug!(
            query_id = %ctx.query_id(),
            operator = "SendUpsert",
            keyspace = self.plan.keyspace().name(),
            pairs = pairs.len(),
            "flushing upsert batch"
        );

        let written = match self.plan.keyspace().upsert(&pairs).await {
            Ok(written) => written,
            Err(e) => {
                ctx.fatal(e);
                return false;
            }
        };

        // Written keys are order-aligned with the submitted pairs.
        for (pair, key) in pairs.into_iter().zip(written) {
            let mut item = pair.item;
            item.set_attachment("meta", json!({ "id": key }));
            if !self.base.send_item(item).await {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl Operator for SendUpsert {
    fn accept(&self, visitor: &mut dyn Visitor) -> Result<()> {
        visitor.visit_send_upsert(self)
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
impl Consumer for SendUpsert {
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
