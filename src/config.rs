//! Configuration management for Ephemera.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration for the Ephemera store and its consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EphemeraConfig {
    /// Rate limiter configuration
    #[serde(default)]
    pub limiter: LimiterConfig,

    /// Blob host configuration
    #[serde(default)]
    pub blobs: BlobConfig,

    /// Background sweep configuration
    #[serde(default)]
    pub sweep: SweepConfig,
}

impl Default for EphemeraConfig {
    fn default() -> Self {
        Self {
            limiter: LimiterConfig::default(),
            blobs: BlobConfig::default(),
            sweep: SweepConfig::default(),
        }
    }
}

/// Fixed-window rate limiter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Maximum hits allowed per window
    #[serde(default = "default_ceiling")]
    pub ceiling: u64,
}

impl LimiterConfig {
    /// Window length as a [`Duration`].
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            ceiling: default_ceiling(),
        }
    }
}

fn default_window_secs() -> u64 {
    60
}

fn default_ceiling() -> u64 {
    10
}

/// Blob host configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobConfig {
    /// Time-to-live for stored blobs, in seconds
    #[serde(default = "default_blob_ttl_secs")]
    pub ttl_secs: u64,

    /// How many generated ids to try before giving up on a collision
    #[serde(default = "default_max_id_attempts")]
    pub max_id_attempts: u32,
}

impl BlobConfig {
    /// Blob time-to-live as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_blob_ttl_secs(),
            max_id_attempts: default_max_id_attempts(),
        }
    }
}

fn default_blob_ttl_secs() -> u64 {
    3600
}

fn default_max_id_attempts() -> u32 {
    4
}

/// Background sweep configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Interval between sweep passes, in seconds
    #[serde(default = "default_sweep_interval_secs")]
    pub interval_secs: u64,
}

impl SweepConfig {
    /// Sweep interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_sweep_interval_secs() -> u64 {
    300
}

impl EphemeraConfig {
    /// Load configuration from a YAML file path.
    pub fn from_file(path: &str) -> crate::error::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> crate::error::Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| crate::error::EphemeraError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make a component unusable.
    fn validate(&self) -> crate::error::Result<()> {
        if self.limiter.window_secs == 0 {
            return Err(crate::error::EphemeraError::Config(
                "limiter.window_secs must be non-zero".to_string(),
            ));
        }
        if self.sweep.interval_secs == 0 {
            return Err(crate::error::EphemeraError::Config(
                "sweep.interval_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EphemeraConfig::default();
        assert_eq!(config.limiter.window_secs, 60);
        assert_eq!(config.limiter.ceiling, 10);
        assert_eq!(config.blobs.ttl_secs, 3600);
        assert_eq!(config.blobs.max_id_attempts, 4);
        assert_eq!(config.sweep.interval_secs, 300);
    }

    #[test]
    fn test_duration_accessors() {
        let config = EphemeraConfig::default();
        assert_eq!(config.limiter.window(), Duration::from_secs(60));
        assert_eq!(config.blobs.ttl(), Duration::from_secs(3600));
        assert_eq!(config.sweep.interval(), Duration::from_secs(300));
    }

    #[test]
    fn test_parse_empty_yaml_uses_defaults() {
        let config = EphemeraConfig::from_yaml("{}").unwrap();
        assert_eq!(config.limiter.ceiling, 10);
        assert_eq!(config.sweep.interval_secs, 300);
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
limiter:
  window_secs: 30
  ceiling: 5
blobs:
  ttl_secs: 120
"#;
        let config = EphemeraConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.limiter.window_secs, 30);
        assert_eq!(config.limiter.ceiling, 5);
        assert_eq!(config.blobs.ttl_secs, 120);
        // Unspecified fields fall back to defaults
        assert_eq!(config.blobs.max_id_attempts, 4);
        assert_eq!(config.sweep.interval_secs, 300);
    }

    #[test]
    fn test_parse_invalid_yaml_fails() {
        let result = EphemeraConfig::from_yaml("limiter: [not, a, map]");
        assert!(matches!(
            result,
            Err(crate::error::EphemeraError::Config(_))
        ));
    }

    #[test]
    fn test_reject_zero_window() {
        let yaml = r#"
limiter:
  window_secs: 0
"#;
        let result = EphemeraConfig::from_yaml(yaml);
        assert!(matches!(
            result,
            Err(crate::error::EphemeraError::Config(_))
        ));
    }

    #[test]
    fn test_reject_zero_sweep_interval() {
        let yaml = r#"
sweep:
  interval_secs: 0
"#;
        let result = EphemeraConfig::from_yaml(yaml);
        assert!(matches!(
            result,
            Err(crate::error::EphemeraError::Config(_))
        ));
    }

    #[test]
    fn test_from_file_missing_path() {
        let result = EphemeraConfig::from_file("/nonexistent/ephemera.yaml");
        assert!(matches!(result, Err(crate::error::EphemeraError::Io(_))));
    }
}
