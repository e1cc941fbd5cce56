//! # Calculation Configuration
//!
//! The YAML document that tells the CLI how the level axis is laid out and
//! how many inner realizations and sites a calculation has:
//!
//! ```yaml
//! intensity_measure_types_and_levels:
//!   - imt: PGA
//!     levels: [0.01, 0.1, 0.5]
//! inner_count: 2
//! site_count: 100
//! ```
//!
//! `site_count` may be overridden with the `HAZCURVE_SITE_COUNT`
//! environment variable.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::imt::IntensityLevels;

/// Environment variable overriding [`HazardConfig::site_count`].
pub const SITE_COUNT_ENV: &str = "HAZCURVE_SITE_COUNT";

/// Calculation configuration loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardConfig {
    /// The level index shared by every map of the calculation.
    #[serde(rename = "intensity_measure_types_and_levels")]
    pub imtls: IntensityLevels,
    /// Number of inner realizations per level.
    #[serde(default = "default_inner_count")]
    pub inner_count: usize,
    /// Total number of sites, used to size exported record arrays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_count: Option<usize>,
}

fn default_inner_count() -> usize {
    1
}

impl HazardConfig {
    /// Parse and validate a configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, then apply environment overrides.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut config = Self::from_yaml_str(&content)?;
        config.apply_overrides(|var| std::env::var(var).ok())?;
        tracing::debug!(
            path = %path.display(),
            levels = config.imtls.total_levels(),
            inner = config.inner_count,
            "loaded hazard configuration"
        );
        Ok(config)
    }

    /// Apply overrides from a variable lookup (normally the process
    /// environment).
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(raw) = lookup(SITE_COUNT_ENV) {
            let count = raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidEnv(SITE_COUNT_ENV.to_string(), raw.clone()))?;
            self.site_count = Some(count);
        }
        Ok(())
    }

    /// Check cross-field constraints not expressed by the types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inner_count == 0 {
            return Err(ConfigError::Invalid(
                "inner_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Total length of the level axis.
    pub fn level_count(&self) -> usize {
        self.imtls.total_levels()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read {path}: {reason}")]
    Read {
        /// Path of the config file.
        path: String,
        /// Underlying IO error message.
        reason: String,
    },

    /// The document is not valid YAML or does not match the schema.
    /// Level-index validation failures surface here too, because
    /// `IntensityLevels` validates while deserializing.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A cross-field or level-index constraint was violated.
    #[error("{0}")]
    Invalid(String),

    /// An environment override holds an unparseable value.
    #[error("invalid value for {0}: {1:?}")]
    InvalidEnv(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
intensity_measure_types_and_levels:
  - imt: PGA
    levels: [0.01, 0.1, 0.5]
  - imt: SA(0.1)
    levels: [0.01, 0.1]
inner_count: 2
site_count: 100
"#;

    #[test]
    fn parses_sample() {
        let config = HazardConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.level_count(), 5);
        assert_eq!(config.inner_count, 2);
        assert_eq!(config.site_count, Some(100));
        assert_eq!(config.imtls.slice("SA(0.1)").unwrap(), 3..5);
    }

    #[test]
    fn inner_count_defaults_to_one() {
        let yaml = "intensity_measure_types_and_levels:\n  - imt: PGA\n    levels: [0.1]\n";
        let config = HazardConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.inner_count, 1);
        assert_eq!(config.site_count, None);
    }

    #[test]
    fn rejects_zero_inner_count() {
        let yaml = "intensity_measure_types_and_levels:\n  - imt: PGA\n    levels: [0.1]\ninner_count: 0\n";
        assert!(matches!(
            HazardConfig::from_yaml_str(yaml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_invalid_levels_through_yaml() {
        let yaml = "intensity_measure_types_and_levels:\n  - imt: PGA\n    levels: [0.5, 0.1]\n";
        assert!(matches!(
            HazardConfig::from_yaml_str(yaml),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn env_override_replaces_site_count() {
        let mut config = HazardConfig::from_yaml_str(SAMPLE).unwrap();
        config
            .apply_overrides(|var| (var == SITE_COUNT_ENV).then(|| "42".to_string()))
            .unwrap();
        assert_eq!(config.site_count, Some(42));
    }

    #[test]
    fn env_override_rejects_garbage() {
        let mut config = HazardConfig::from_yaml_str(SAMPLE).unwrap();
        let err = config
            .apply_overrides(|_| Some("many".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv(..)));
    }

    #[test]
    fn from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.yaml");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = HazardConfig::from_path(&path).unwrap();
        assert_eq!(config.level_count(), 5);
    }

    #[test]
    fn from_path_missing_file() {
        let err = HazardConfig::from_path(Path::new("/nonexistent/job.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
