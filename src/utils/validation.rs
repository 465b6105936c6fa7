use crate::utils::error::{EtlError, Result};
use std::collections::HashSet;
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_file_extension(field_name: &str, file: &str, allowed_extensions: &[&str]) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    match Path::new(file).extension().and_then(|ext| ext.to_str()) {
        Some(extension) if allowed_set.contains(extension.to_ascii_lowercase().as_str()) => Ok(()),
        Some(extension) => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                extension,
                allowed_extensions.join(", ")
            ),
        }),
        None => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

/// Checks every configured input: a usable path ending in `.csv`.
pub fn validate_sources<'a, I>(sources: I) -> Result<()>
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    for (key, path) in sources {
        validate_path(key, path)?;
        validate_file_extension(key, path, &["csv"])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("database_path", "./fdc.sqlite").is_ok());
        assert!(validate_path("database_path", "  ").is_err());
        assert!(validate_path("database_path", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("batch_size", 10_000, 1).is_ok());
        assert!(validate_positive_number("batch_size", 0, 1).is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension("food_input_file", "food.csv", &["csv"]).is_ok());
        assert!(validate_file_extension("food_input_file", "FOOD.CSV", &["csv"]).is_ok());
        assert!(validate_file_extension("food_input_file", "food.json", &["csv"]).is_err());
        assert!(validate_file_extension("food_input_file", "food", &["csv"]).is_err());
    }

    #[test]
    fn test_validate_sources_names_the_offending_key() {
        let mut sources = HashMap::new();
        sources.insert("food_input_file".to_string(), "data/food.csv".to_string());
        sources.insert("nutrient_input_file".to_string(), "data/nutrient.txt".to_string());

        match validate_sources(&sources).unwrap_err() {
            EtlError::InvalidConfigValueError { field, .. } => {
                assert_eq!(field, "nutrient_input_file")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
