//! Rollup configuration presets

use dkg_rollup_storage::TreeShape;

/// Configuration for the rollup driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollupConfig {
    /// Maximum number of actions folded into one proof chain
    pub max_batch_size: usize,

    /// Shape of the dedup tree. Contracts and workers must agree on it.
    pub dedup_shape: TreeShape,
}

impl Default for RollupConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 128,
            dedup_shape: TreeShape::FULL,
        }
    }
}

impl RollupConfig {
    /// Short batches for latency-sensitive committees
    pub fn small_batch() -> Self {
        Self {
            max_batch_size: 16,
            ..Self::default()
        }
    }

    /// Long batches for catching up on a backlog
    pub fn large_batch() -> Self {
        Self {
            max_batch_size: 1024,
            ..Self::default()
        }
    }

    pub fn with_dedup_shape(mut self, shape: TreeShape) -> Self {
        self.dedup_shape = shape;
        self
    }
}
