//! Expression evaluation contract.
//!
//! Real expression/algebra evaluation is an external collaborator; the
//! engine only needs "evaluate expression E against item I in context C".
//! The two built-ins here are what mutation plan nodes actually use for
//! keys: a dotted field path into the payload, and a literal.

use std::fmt;
use std::sync::Arc;

use driftq_common::{DriftqError, Item, Result};
use serde_json::Value;

use crate::context::ExecutionContext;

/// Evaluate-against-one-item contract consumed by operators.
pub trait Expression: Send + Sync + fmt::Debug {
    /// Compute this expression's value for `item`.
    fn evaluate(&self, item: &Item, ctx: &ExecutionContext) -> Result<Value>;

    /// Short human-readable rendering for plan introspection.
    fn describe(&self) -> String;
}

/// Shared expression handle carried by plan nodes.
pub type SharedExpression = Arc<dyn Expression>;

/// Dotted path into an item's payload, e.g. `meta.code`.
#[derive(Debug, Clone)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parse a dotted path. Empty segments are rejected.
    pub fn parse(path: &str) -> Result<Self> {
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(DriftqError::InvalidConfig(format!(
                "invalid field path {path:?}"
            )));
        }
        Ok(Self { segments })
    }
}

impl Expression for FieldPath {
    fn evaluate(&self, item: &Item, _ctx: &ExecutionContext) -> Result<Value> {
        let mut current = item.value();
        for segment in &self.segments {
            current = current.get(segment).ok_or_else(|| {
                DriftqError::Evaluation(format!(
                    "field {} not present in value {}",
                    self.describe(),
                    item.value()
                ))
            })?;
        }
        Ok(current.clone())
    }

    fn describe(&self) -> String {
        self.segments.join(".")
    }
}

/// Constant expression, independent of the item.
#[derive(Debug, Clone)]
pub struct Literal(
    /// The constant value produced for every item.
    pub Value,
);

impl Expression for Literal {
    fn evaluate(&self, _item: &Item, _ctx: &ExecutionContext) -> Result<Value> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        self.0.to_string()
    }
}
