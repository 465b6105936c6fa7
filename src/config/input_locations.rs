use crate::adapters::sqlite::loader::DEFAULT_BATCH_SIZE;
use crate::core::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_LOCATIONS_FILE: &str = "input_locations.txt";
pub const DEFAULT_DATABASE_PATH: &str = "fdc.sqlite";

const DATABASE_PATH_KEY: &str = "database_path";
const BATCH_SIZE_KEY: &str = "batch_size";
const SOURCE_KEY_SUFFIX: &str = "_input_file";

/// Plain `key=value` input locations file.
///
/// ```text
/// # FoodData Central CSV export
/// food_input_file=data/food.csv
/// nutrient_input_file=data/nutrient.csv
/// database_path=fdc.sqlite
/// ```
///
/// Blank lines and lines starting with `#` are ignored. The value is
/// everything after the first `=`.
#[derive(Debug, Clone, PartialEq)]
pub struct InputLocations {
    sources: HashMap<String, String>,
    database_path: String,
    batch_size: usize,
}

impl InputLocations {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut sources = HashMap::new();
        let mut database_path = DEFAULT_DATABASE_PATH.to_string();
        let mut batch_size = DEFAULT_BATCH_SIZE;

        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                tracing::warn!("Ignoring line {} without '=': {}", index + 1, line);
                continue;
            };
            let (key, value) = (key.trim(), value.trim());

            match key {
                DATABASE_PATH_KEY => database_path = value.to_string(),
                BATCH_SIZE_KEY => {
                    batch_size = value.parse().map_err(|_| EtlError::InvalidConfigValueError {
                        field: BATCH_SIZE_KEY.to_string(),
                        value: value.to_string(),
                        reason: "Expected a whole number".to_string(),
                    })?;
                }
                _ if key.ends_with(SOURCE_KEY_SUFFIX) => {
                    sources.insert(key.to_string(), value.to_string());
                }
                _ => tracing::warn!("Ignoring unknown key '{}' on line {}", key, index + 1),
            }
        }

        Ok(Self {
            sources,
            database_path,
            batch_size,
        })
    }
}

impl ConfigProvider for InputLocations {
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

impl Validate for InputLocations {
    fn validate(&self) -> Result<()> {
        validation::validate_path(DATABASE_PATH_KEY, &self.database_path)?;
        validation::validate_positive_number(BATCH_SIZE_KEY, self.batch_size, 1)?;
        validation::validate_sources(&self.sources)
    }
}
