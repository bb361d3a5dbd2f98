//! Shared fixtures for pipeline integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use driftq_common::{DriftqError, Item, Result};
use driftq_storage::{Keyspace, MemoryKeyspace, Pair};
use serde_json::json;

/// Items with a string `code` field usable as an upsert/delete key.
pub fn coded_items(codes: &[&str]) -> Vec<Item> {
    codes
        .iter()
        .map(|code| Item::new(json!({ "code": code })))
        .collect()
}

/// Keyspace wrapper that records the size of every bulk call it receives.
pub struct RecordingKeyspace {
    inner: MemoryKeyspace,
    batch_sizes: Mutex<Vec<usize>>,
}

impl RecordingKeyspace {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryKeyspace::new(name),
            batch_sizes: Mutex::new(Vec::new()),
        })
    }

    /// Sizes of the bulk calls observed so far, in call order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().expect("batch sizes").clone()
    }

    pub fn inner(&self) -> &MemoryKeyspace {
        &self.inner
    }

    fn record(&self, size: usize) {
        self.batch_sizes.lock().expect("batch sizes").push(size);
    }
}

#[async_trait]
impl Keyspace for RecordingKeyspace {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch(&self, keys: &[String]) -> Result<Vec<Pair>> {
        self.inner.fetch(keys).await
    }

    async fn insert(&self, pairs: &[Pair]) -> Result<Vec<String>> {
        self.record(pairs.len());
        self.inner.insert(pairs).await
    }

    async fn upsert(&self, pairs: &[Pair]) -> Result<Vec<String>> {
        self.record(pairs.len());
        self.inner.upsert(pairs).await
    }

    async fn delete(&self, keys: &[String]) -> Result<Vec<String>> {
        self.record(keys.len());
        self.inner.delete(keys).await
    }
}

/// Keyspace whose every bulk call fails at the call level.
pub struct FailingKeyspace {
    name: String,
}

impl FailingKeyspace {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
        })
    }

    fn refuse<T>(&self) -> Result<T> {
        Err(DriftqError::Storage(format!(
            "keyspace {} rejected the call",
            self.name
        )))
    }
}

#[async_trait]
impl Keyspace for FailingKeyspace {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, _keys: &[String]) -> Result<Vec<Pair>> {
        self.refuse()
    }

    async fn insert(&self, _pairs: &[Pair]) -> Result<Vec<String>> {
        self.refuse()
    }

    async fn upsert(&self, _pairs: &[Pair]) -> Result<Vec<String>> {
        self.refuse()
    }

    async fn delete(&self, _keys: &[String]) -> Result<Vec<String>> {
        self.refuse()
    }
}
