//! Valuation configuration loader.

use std::path::Path;

use anyhow::Context;
use appraiser_core::ValuationConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for valuation configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys take their defaults, so an empty file yields
    /// [`ValuationConfig::default`].
    pub fn load(path: &Path) -> LoadResult<ValuationConfig> {
        let content = read_file(path)?;
        let config: ValuationConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config TOML {}", path.display()))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_iterations = 250\n\n[priority_weights]\nhigh = 2.0\n")
            .expect("write config");

        let config = ConfigLoader::load(&path).expect("load config");
        assert_eq!(config.default_iterations, 250);
        assert_eq!(config.priority_weights.high, 2.0);
        assert_eq!(config.priority_weights.low, 0.25);
    }

    #[test]
    fn malformed_config_names_the_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_iterations = \"many\"").expect("write config");

        let err = ConfigLoader::load(&path).expect_err("string is not a count");
        assert!(err.to_string().contains("config.toml"));
    }
}
