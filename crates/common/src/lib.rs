//! Shared configuration, error types, IDs, and the annotated item model for DriftQ crates.
//!
//! Architecture role:
//! - defines pipeline configuration passed across layers
//! - provides common [`DriftqError`] / [`Result`] contracts
//! - hosts the [`Item`] value model flowing between operators
//!
//! Key modules:
//! - [`config`]
//! - [`error`]
//! - [`ids`]
//! - [`item`]

pub mod config;
pub mod error;
pub mod ids;
pub mod item;

pub use config::PipelineConfig;
pub use error::{DriftqError, Result};
pub use ids::QueryId;
pub use item::Item;
