//! Application Configuration
//!
//! Configuration for the record application layer.

/// Scammer application configuration
#[derive(Debug, Clone)]
pub struct ScammerConfig {
    /// Listing size when the caller gives none
    pub default_list_limit: usize,
    /// Upper bound for a listing
    pub max_list_limit: usize,
}

impl Default for ScammerConfig {
    fn default() -> Self {
        Self {
            default_list_limit: 50,
            max_list_limit: 200,
        }
    }
}

impl ScammerConfig {
    /// Effective listing size: default when absent, capped at the maximum
    pub fn list_limit(&self, requested: Option<usize>) -> Option<usize> {
        match requested {
            None => Some(self.default_list_limit),
            Some(0) => None,
            Some(n) => Some(n.min(self.max_list_limit)),
        }
    }
}
