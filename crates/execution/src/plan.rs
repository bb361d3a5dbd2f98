//! Read-only plan-node configuration consumed by operators.
//!
//! The planner/compiler producing these nodes is an external collaborator;
//! operators only read them. Each node carries the target keyspace handle,
//! the key expression (where one applies), and optional per-node tuning.

use driftq_common::PipelineConfig;
use driftq_storage::SharedKeyspace;

use crate::expression::SharedExpression;

/// Configuration for a batched-upsert consumer.
#[derive(Clone)]
pub struct SendUpsertPlan {
    keyspace: SharedKeyspace,
    key: Option<SharedExpression>,
    batch_size: Option<usize>,
}

impl SendUpsertPlan {
    /// Upsert into `keyspace`, keyed by `key` when present. Without a key
    /// expression the store assigns keys.
    pub fn new(keyspace: SharedKeyspace, key: Option<SharedExpression>) -> Self {
        Self {
            keyspace,
            key,
            batch_size: None,
        }
    }

    /// Override the ambient batch size for this node.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Target keyspace handle.
    pub fn keyspace(&self) -> &SharedKeyspace {
        &self.keyspace
    }

    /// Key expression, if one was configured.
    pub fn key(&self) -> Option<&SharedExpression> {
        self.key.as_ref()
    }

    /// Effective flush threshold under `config`.
    pub fn batch_size(&self, config: &PipelineConfig) -> usize {
        self.batch_size.unwrap_or(config.batch_size).max(1)
    }
}

/// Configuration for a batched-delete consumer. The key expression is
/// mandatory: a delete with no key is meaningless.
#[derive(Clone)]
pub struct SendDeletePlan {
    keyspace: SharedKeyspace,
    key: SharedExpression,
    batch_size: Option<usize>,
}

impl SendDeletePlan {
    /// Delete from `keyspace` the key computed by `key` for each item.
    pub fn new(keyspace: SharedKeyspace, key: SharedExpression) -> Self {
        Self {
            keyspace,
            key,
            batch_size: None,
        }
    }

    /// Override the ambient batch size for this node.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Target keyspace handle.
    pub fn keyspace(&self) -> &SharedKeyspace {
        &self.keyspace
    }

    /// Key expression evaluated per item.
    pub fn key(&self) -> &SharedExpression {
        &self.key
    }

    /// Effective flush threshold under `config`.
    pub fn batch_size(&self, config: &PipelineConfig) -> usize {
        self.batch_size.unwrap_or(config.batch_size).max(1)
    }
}
