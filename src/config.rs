//! Ledger configuration

use serde::{Deserialize, Serialize};

/// Tunables for the ledger core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// How many times a balance update is re-read and retried after losing a
    /// compare-and-swap race before giving up with a conflict error
    #[serde(default = "default_max_update_attempts")]
    pub max_update_attempts: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_update_attempts: default_max_update_attempts(),
        }
    }
}

fn default_max_update_attempts() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: LedgerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, LedgerConfig::default());
        assert_eq!(config.max_update_attempts, 64);
    }
}
