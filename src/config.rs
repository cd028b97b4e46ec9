//! Runtime configuration of generation

use serde::{Deserialize, Serialize};

/// Tunables of a [`Generator`][crate::Generator]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenConfig {
    /// How many times a field rewrite may be rewritten again before the
    /// field is considered to never reach a fixed point. Only nested
    /// rewrites count, so this does not grow with the dimension
    pub max_rewrite_depth: usize,
}

impl Default for GenConfig {
    fn default() -> Self {
        GenConfig {
            max_rewrite_depth: 64,
        }
    }
}
