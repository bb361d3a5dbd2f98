use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use driftq_common::{DriftqError, Item, Result};
use tokio::sync::Mutex;

use crate::keyspace::{Keyspace, Pair};

/// In-memory keyspace backed by a map.
///
/// The reference collaborator for embedded pipelines and tests. Keyless
/// pairs get sequential store-assigned keys of the form `<name>::<n>`.
pub struct MemoryKeyspace {
    name: String,
    docs: Mutex<BTreeMap<String, Item>>,
    next_key: AtomicU64,
}

impl MemoryKeyspace {
    /// Create an empty keyspace with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            docs: Mutex::new(BTreeMap::new()),
            next_key: AtomicU64::new(0),
        }
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.docs.lock().await.len()
    }

    /// True when no documents are stored.
    pub async fn is_empty(&self) -> bool {
        self.docs.lock().await.is_empty()
    }

    fn assign_key(&self) -> String {
        let n = self.next_key.fetch_add(1, Ordering::Relaxed);
        format!("{}::{}", self.name, n)
    }
}

#[async_trait]
impl Keyspace for MemoryKeyspace {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, keys: &[String]) -> Result<Vec<Pair>> {
        let docs = self.docs.lock().await;
        Ok(keys
            .iter()
            .filter_map(|k| {
                docs.get(k).map(|item| Pair {
                    key: Some(k.clone()),
                    item: item.clone(),
                })
            })
            .collect())
    }

    async fn insert(&self, pairs: &[Pair]) -> Result<Vec<String>> {
        let mut docs = self.docs.lock().await;
        for pair in pairs {
            if let Some(key) = &pair.key {
                if docs.contains_key(key) {
                    return Err(DriftqError::Storage(format!(
                        "duplicate key {key} in keyspace {}",
                        self.name
                    )));
                }
            }
        }
        let mut written = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let key = match &pair.key {
                Some(key) => key.clone(),
                None => self.assign_key(),
            };
            docs.insert(key.clone(), pair.item.clone());
            written.push(key);
        }
        Ok(written)
    }

    async fn upsert(&self, pairs: &[Pair]) -> Result<Vec<String>> {
        let mut docs = self.docs.lock().await;
        let mut written = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let key = match &pair.key {
                Some(key) => key.clone(),
                None => self.assign_key(),
            };
            docs.insert(key.clone(), pair.item.clone());
            written.push(key);
        }
        Ok(written)
    }

    async fn delete(&self, keys: &[String]) -> Result<Vec<String>> {
        let mut docs = self.docs.lock().await;
        Ok(keys
            .iter()
            .filter(|k| docs.remove(*k).is_some())
            .cloned()
            .collect())
    }
}
