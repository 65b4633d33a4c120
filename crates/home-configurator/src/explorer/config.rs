use serde::{Deserialize, Serialize};

/// Tuning for the price-range explorer. The closure threshold only controls
/// when a large dependency set is logged; the search itself is unbounded and
/// catalog sizing stays the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorerConfig {
    pub closure_warn_threshold: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            closure_warn_threshold: 16,
        }
    }
}
