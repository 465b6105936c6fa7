use crate::domain::model::EntityKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration key '{field}' (available: {available})")]
    MissingConfigError { field: String, available: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Source for {entity} unavailable at {}: {source}", .path.display())]
    SourceUnavailable {
        entity: EntityKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Extraction of {entity} failed: {message}")]
    ExtractionTask { entity: EntityKind, message: String },

    #[error("Store error while {context} (code {}): {message}", fmt_code(.code))]
    StoreError {
        context: String,
        code: Option<i32>,
        message: String,
    },

    #[error("Store is not initialized; refusing to load '{table}'")]
    StoreNotInitialized { table: String },

    #[error("Dataset for '{table}' is empty; nothing to load")]
    EmptyDataset { table: String },

    #[error(
        "Insert into '{table}' failed at row {row} (code {}): {message}; {committed_rows} rows from earlier batches remain committed",
        fmt_code(.code)
    )]
    BatchInsertError {
        table: String,
        row: usize,
        committed_rows: usize,
        code: Option<i32>,
        message: String,
    },
}

fn fmt_code(code: &Option<i32>) -> String {
    code.map(|c| c.to_string()).unwrap_or_else(|| "n/a".to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Source,
    Extraction,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    /// Wraps a SQLite failure, keeping its extended result code.
    pub fn store(context: impl Into<String>, err: rusqlite::Error) -> Self {
        let code = err.sqlite_error().map(|e| e.extended_code);
        EtlError::StoreError {
            context: context.into(),
            code,
            message: err.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigError { .. }
            | EtlError::TomlError(_)
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            EtlError::IoError(_) | EtlError::SourceUnavailable { .. } => ErrorCategory::Source,
            EtlError::CsvError(_) | EtlError::ExtractionTask { .. } => ErrorCategory::Extraction,
            EtlError::StoreError { .. }
            | EtlError::StoreNotInitialized { .. }
            | EtlError::EmptyDataset { .. }
            | EtlError::BatchInsertError { .. } => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::EmptyDataset { .. } => ErrorSeverity::Low,
            EtlError::ConfigError { .. }
            | EtlError::TomlError(_)
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::IoError(_)
            | EtlError::CsvError(_)
            | EtlError::SourceUnavailable { .. }
            | EtlError::ExtractionTask { .. } => ErrorSeverity::High,
            EtlError::StoreError { .. }
            | EtlError::StoreNotInitialized { .. }
            | EtlError::BatchInsertError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Process exit status for this failure; never zero.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low | ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::MissingConfigError { field, .. } => {
                format!("The configuration does not name an input file for '{}'", field)
            }
            EtlError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            EtlError::SourceUnavailable { entity, path, .. } => format!(
                "Could not read the {} input file at {}",
                entity,
                path.display()
            ),
            EtlError::ExtractionTask { entity, .. } => {
                format!("Extraction of {} did not complete", entity)
            }
            EtlError::BatchInsertError {
                table, row, code, ..
            } => format!(
                "Loading '{}' failed at row {} (SQLite code {})",
                table,
                row,
                fmt_code(code)
            ),
            EtlError::StoreError { context, code, .. } => format!(
                "Database operation failed while {} (SQLite code {})",
                context,
                fmt_code(code)
            ),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the configuration file for missing keys or invalid values"
            }
            ErrorCategory::Source => "Verify the input file paths exist and are readable",
            ErrorCategory::Extraction => "Inspect the input CSV for structural damage",
            ErrorCategory::Storage => {
                "Remove the partially loaded database file and rerun the pipeline from scratch"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
