use std::sync::Arc;

use async_trait::async_trait;
use driftq_common::{Item, Result};

/// One key/item pair submitted to a bulk mutation.
///
/// `key` is `None` when no key expression was configured for the mutation;
/// the keyspace then assigns one and reports it in the returned key list.
#[derive(Debug, Clone)]
pub struct Pair {
    /// Key to write under, if the caller chose one.
    pub key: Option<String>,
    /// The record to write.
    pub item: Item,
}

/// Type-erased keyspace handle shared by plan nodes and operators.
pub type SharedKeyspace = Arc<dyn Keyspace>;

/// Bulk mutation/fetch contract for a backing store.
///
/// All operations are bulk: one call per batch, never per item. Returned
/// key lists are order-aligned with the request, so callers can zip them
/// back onto the submitted pairs. A call-level failure means the whole
/// batch was rejected; implementations do not retry internally.
#[async_trait]
pub trait Keyspace: Send + Sync {
    /// Name of this keyspace, for diagnostics.
    fn name(&self) -> &str;

    /// Read the pairs stored under `keys`. Unknown keys are skipped.
    async fn fetch(&self, keys: &[String]) -> Result<Vec<Pair>>;

    /// Write pairs that must not already exist.
    ///
    /// # Errors
    /// Returns a storage error if any pair's key is already present; in
    /// that case nothing from the batch is written.
    async fn insert(&self, pairs: &[Pair]) -> Result<Vec<String>>;

    /// Write pairs, overwriting existing keys. Returns the key each pair
    /// was written under, in pair order.
    async fn upsert(&self, pairs: &[Pair]) -> Result<Vec<String>>;

    /// Remove `keys`, returning the subset that was actually present.
    async fn delete(&self, keys: &[String]) -> Result<Vec<String>>;
}
