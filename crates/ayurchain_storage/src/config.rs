//! Ledger configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How an existing ledger file is read on open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Trust stored fingerprints; start fresh if the file is unreadable
    #[default]
    FallbackToGenesis,
    /// Trust stored fingerprints; fail if the file is unreadable
    Trusting,
    /// Audit the chain and refuse to open a tampered ledger
    Verified,
}

/// Ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Ledger file
    pub path: PathBuf,
    /// Hold an exclusive lock file while open
    pub lock: bool,
    /// How to read an existing file
    pub load_policy: LoadPolicy,
}

impl LedgerConfig {
    /// Default ledger location, relative to the working directory
    pub const DEFAULT_PATH: &'static str = "data/ledger.json";

    /// Configuration for a ledger at `path` with default settings
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Set the lock flag
    #[must_use]
    pub fn with_lock(mut self, lock: bool) -> Self {
        self.lock = lock;
        self
    }

    /// Set the load policy
    #[must_use]
    pub fn with_load_policy(mut self, policy: LoadPolicy) -> Self {
        self.load_policy = policy;
        self
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(Self::DEFAULT_PATH),
            lock: true,
            load_policy: LoadPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.path, PathBuf::from("data/ledger.json"));
        assert!(config.lock);
        assert_eq!(config.load_policy, LoadPolicy::FallbackToGenesis);
    }

    #[test]
    fn test_builder() {
        let config = LedgerConfig::at("/tmp/x.json")
            .with_lock(false)
            .with_load_policy(LoadPolicy::Verified);
        assert_eq!(config.path, PathBuf::from("/tmp/x.json"));
        assert!(!config.lock);
        assert_eq!(config.load_policy, LoadPolicy::Verified);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&LoadPolicy::FallbackToGenesis).unwrap();
        assert_eq!(json, "\"fallback_to_genesis\"");
        let config: LedgerConfig = serde_json::from_str(
            r#"{"path": "ledger.json", "lock": false, "load_policy": "verified"}"#,
        )
        .unwrap();
        assert_eq!(config.load_policy, LoadPolicy::Verified);
    }
}
