use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime settings of the transfer engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Bounded wait for each account lock, in milliseconds
    pub lock_timeout_ms: u64,
    /// Include system failure detail in messages returned to callers
    pub expose_failure_detail: bool,
}

impl EngineConfig {
    pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;

    /// Create a config; a zero lock timeout falls back to the default
    pub fn new(lock_timeout_ms: u64, expose_failure_detail: bool) -> Self {
        let lock_timeout_ms = if lock_timeout_ms == 0 {
            tracing::warn!(
                lock_timeout_ms,
                default = Self::DEFAULT_LOCK_TIMEOUT_MS,
                "Invalid lock timeout, using default"
            );
            Self::DEFAULT_LOCK_TIMEOUT_MS
        } else {
            lock_timeout_ms
        };

        Self {
            lock_timeout_ms,
            expose_failure_detail,
        }
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: Self::DEFAULT_LOCK_TIMEOUT_MS,
            expose_failure_detail: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.lock_timeout(), Duration::from_secs(5));
        assert!(!config.expose_failure_detail);
    }

    #[rstest]
    #[case::custom(250, 250)]
    #[case::zero_falls_back(0, EngineConfig::DEFAULT_LOCK_TIMEOUT_MS)]
    fn test_new_lock_timeout(#[case] requested: u64, #[case] expected: u64) {
        assert_eq!(EngineConfig::new(requested, false).lock_timeout_ms, expected);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "expose_failure_detail": true }"#).unwrap();

        assert_eq!(config.lock_timeout_ms, EngineConfig::DEFAULT_LOCK_TIMEOUT_MS);
        assert!(config.expose_failure_detail);
    }
}
