use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::CheckResult;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CheckConfig {
    /// Intersection area at or below this is not treated as an overlap
    pub area_epsilon: f64,
    pub borderless: BorderlessConfig,
}

/// Categories that are exempt from exclusive-border checks
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BorderlessConfig {
    /// Matched against `entity1name`
    pub entity_names: Vec<String>,
    /// Matched against `entity1type` and `entity2type`
    pub entity_types: Vec<String>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            area_epsilon: 0.0,
            borderless: BorderlessConfig::default(),
        }
    }
}

impl Default for BorderlessConfig {
    fn default() -> Self {
        Self {
            entity_names: vec!["Indigenous".to_string()],
            entity_types: ["tribe", "tribal", "reservation", "pueblo"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl CheckConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> CheckResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> CheckResult<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CheckConfig::default();
        assert_eq!(config.area_epsilon, 0.0);
        assert!(config.borderless.entity_types.iter().any(|t| t == "pueblo"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CheckConfig::from_toml("area_epsilon = 1e-9\n").unwrap();
        assert_eq!(config.area_epsilon, 1e-9);
        assert_eq!(config.borderless.entity_names, vec!["Indigenous".to_string()]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[borderless]").unwrap();
        writeln!(file, "entity_types = [\"mission\"]").unwrap();

        let config = CheckConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.borderless.entity_types, vec!["mission".to_string()]);
        assert_eq!(config.borderless.entity_names, vec!["Indigenous".to_string()]);
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = CheckConfig::from_toml("area_epsilon = \"wide\"").unwrap_err();
        assert!(matches!(err, crate::error::CheckError::Config(_)));
    }
}
