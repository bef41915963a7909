//! Allocator configuration parameters.

use sparsa_core::INDEX_MAX;

/// Configuration for the allocation primitive.
///
/// Validated by the session at construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllocConfig {
    /// Largest legal item count and item size for a single request.
    ///
    /// Default: [`INDEX_MAX`] (2^60). Must be non-zero and must not exceed
    /// `INDEX_MAX`.
    pub index_max: u64,
}

impl AllocConfig {
    /// Create a config with the engine-wide index bound.
    pub fn new() -> Self {
        Self {
            index_max: INDEX_MAX,
        }
    }

    /// Create a config with a tighter index bound.
    pub fn with_index_max(index_max: u64) -> Self {
        Self { index_max }
    }

    /// Whether the bound lies in `1..=INDEX_MAX`.
    pub fn is_valid(&self) -> bool {
        self.index_max != 0 && self.index_max <= INDEX_MAX
    }
}

impl Default for AllocConfig {
    fn default() -> Self {
        Self::new()
    }
}
