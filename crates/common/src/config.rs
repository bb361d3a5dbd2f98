use serde::{Deserialize, Serialize};

/// Ambient per-pipeline configuration shared through the execution context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Default flush threshold for batching mutation consumers.
    pub batch_size: usize,
    /// Buffer size of the item channel between adjacent operators.
    ///
    /// A slow consumer throttles its producer once this many items are
    /// in flight on one edge.
    pub channel_capacity: usize,
    /// Optional wall-clock deadline for the whole pipeline, in milliseconds.
    pub timeout_ms: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 64,
            channel_capacity: 64,
            timeout_ms: None,
        }
    }
}
