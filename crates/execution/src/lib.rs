#![deny(missing_docs)]

//! Operator pipeline execution engine.
//!
//! Architecture role:
//! - per-query execution context with error/warning signaling and cancellation
//! - operator lifecycle contract and shared wiring state
//! - sequence composition and batching mutation consumers
//! - pipeline launch facade for callers
//!
//! Key modules:
//! - [`context`]
//! - [`operator`]
//! - [`consumer`]
//! - [`sequence`]
//! - [`send_upsert`] / [`send_delete`]
//! - [`expression`]
//! - [`plan`]
//! - [`visitor`]
//! - [`executor`]

pub mod consumer;
pub mod context;
pub mod executor;
pub mod expression;
pub mod operator;
pub mod plan;
pub mod send_delete;
pub mod send_upsert;
pub mod sequence;
pub mod visitor;

// Re-export only what callers need at the crate root (no globs).
pub use context::{ContextSignals, ExecutionContext};
pub use executor::{launch, PipelineHandle, PipelineOutcome};
pub use expression::{Expression, FieldPath, Literal, SharedExpression};
pub use operator::{
    BoxedOperator, ItemReceiver, ItemSender, Operator, OperatorBase, StopReceiver, StopSender,
};
pub use plan::{SendDeletePlan, SendUpsertPlan};
pub use send_delete::SendDelete;
pub use send_upsert::SendUpsert;
pub use sequence::Sequence;
pub use visitor::{explain, PlanFormatter, Visitor};
