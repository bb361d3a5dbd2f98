//! Keyspace collaborator contract and the in-memory keyspace for DriftQ.
//!
//! Architecture role:
//! - defines the bulk mutation/fetch contract pipelines write against
//! - provides the in-memory reference keyspace used by embedded runs and tests
//!
//! Key modules:
//! - [`keyspace`]
//! - [`memory`]

pub mod keyspace;
pub mod memory;

pub use keyspace::{Keyspace, Pair, SharedKeyspace};
pub use memory::MemoryKeyspace;
