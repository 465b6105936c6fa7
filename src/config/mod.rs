#[cfg(feature = "cli")]
pub mod cli;
pub mod input_locations;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use input_locations::InputLocations;
pub use toml_config::TomlConfig;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::collections::HashMap;
use std::path::Path;

/// Settings for one run, whichever file format they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct EtlConfig {
    pub name: String,
    pub sources: HashMap<String, String>,
    pub database_path: String,
    pub batch_size: usize,
    pub monitoring: bool,
}

impl EtlConfig {
    /// `.toml` files are read as TOML, anything else as an input locations file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            tracing::debug!("Reading TOML configuration from {}", path.display());
            TomlConfig::from_file(path).map(Self::from)
        } else {
            tracing::debug!("Reading input locations from {}", path.display());
            InputLocations::from_file(path).map(Self::from)
        }
    }

    pub fn with_database_path(mut self, database_path: impl Into<String>) -> Self {
        self.database_path = database_path.into();
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_monitoring(mut self, monitoring: bool) -> Self {
        self.monitoring = monitoring;
        self
    }
}

impl From<TomlConfig> for EtlConfig {
    fn from(config: TomlConfig) -> Self {
        Self {
            batch_size: config.batch_size(),
            monitoring: config.monitoring_enabled(),
            name: config.pipeline.name,
            sources: config.sources,
            database_path: config.load.database_path,
        }
    }
}

impl From<InputLocations> for EtlConfig {
    fn from(locations: InputLocations) -> Self {
        Self {
            name: "fdc-etl".to_string(),
            sources: locations.source_locations().clone(),
            database_path: locations.database_path().to_string(),
            batch_size: locations.batch_size(),
            monitoring: false,
        }
    }
}

impl ConfigProvider for EtlConfig {
    fn source_locations(&self) -> &HashMap<String, String> {
        &self.sources
    }

    fn database_path(&self) -> &str {
        &self.database_path
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl Validate for EtlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("database_path", &self.database_path)?;
        validation::validate_positive_number("batch_size", self.batch_size, 1)?;
        validation::validate_sources(&self.sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_format_is_chosen_by_extension() {
        let dir = TempDir::new().unwrap();
        let toml_path = dir.path().join("fdc-etl.toml");
        fs::write(
            &toml_path,
            "[sources]\nfood_input_file = \"food.csv\"\n\n[load]\ndatabase_path = \"a.sqlite\"\n",
        )
        .unwrap();
        let txt_path = dir.path().join("input_locations.txt");
        fs::write(&txt_path, "food_input_file=food.csv\ndatabase_path=b.sqlite\n").unwrap();

        let from_toml = EtlConfig::from_file(&toml_path).unwrap();
        let from_txt = EtlConfig::from_file(&txt_path).unwrap();

        assert_eq!(from_toml.database_path, "a.sqlite");
        assert_eq!(from_txt.database_path, "b.sqlite");
        assert_eq!(from_toml.sources, from_txt.sources);
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let config = EtlConfig::from(InputLocations::parse("food_input_file=food.csv").unwrap())
            .with_database_path("override.sqlite")
            .with_batch_size(42)
            .with_monitoring(true);

        assert_eq!(config.database_path(), "override.sqlite");
        assert_eq!(config.batch_size(), 42);
        assert!(config.monitoring);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_is_a_source_error() {
        let err = EtlConfig::from_file("/nonexistent/fdc-etl.toml").unwrap_err();
        assert!(matches!(err, crate::utils::error::EtlError::IoError(_)));
    }
}
