use crate::domain::model::{EntityKind, FdcDatasets};
use crate::utils::error::Result;
use async_trait::async_trait;
use rusqlite::ToSql;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

pub trait ConfigProvider: Send + Sync {
    /// Config key to input path, before resolution against the entity catalogue.
    fn source_locations(&self) -> &HashMap<String, String>;
    fn database_path(&self) -> &str;
    fn batch_size(&self) -> usize;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    type Extracted: Send;
    type Transformed: Send;
    type Loaded: Send;

    async fn extract(&self) -> Result<Self::Extracted>;
    async fn transform(&self, data: Self::Extracted) -> Result<Self::Transformed>;
    async fn load(&self, data: Self::Transformed) -> Result<Self::Loaded>;
}

/// A typed record read from one header-bearing CSV file.
pub trait CsvRecord: Sized + Send + 'static {
    const ENTITY: EntityKind;

    /// Shape of one CSV row as it appears on disk.
    type Row: DeserializeOwned;

    /// Column checked on the raw row before anything else is parsed.
    const SCOPE_COLUMN: Option<&'static str> = None;

    /// `false` filters the row as out of scope, however damaged its other fields are.
    fn in_scope(_value: &str) -> bool {
        true
    }

    /// `None` drops the row as out of scope (not malformed).
    fn from_row(row: Self::Row) -> Option<Self>;
}

/// A typed record persisted into one table of the store.
pub trait TableRecord {
    const ENTITY: EntityKind;
    const COLUMNS: &'static [&'static str];
    const CREATE_TABLE: &'static str;

    /// Values in `COLUMNS` order; `None` fields bind as NULL.
    fn sql_params(&self) -> Vec<&dyn ToSql>;
}

/// Records carrying their own authoritative key.
pub trait Keyed {
    fn key(&self) -> i64;
}

/// Records referencing an authoritative key.
pub trait References {
    fn foreign_key(&self) -> i64;
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct TransformReport {
    pub transform: &'static str,
    pub removed: Vec<(EntityKind, usize)>,
    #[serde(with = "crate::utils::duration_ms")]
    pub elapsed: Duration,
}

impl TransformReport {
    pub fn total_removed(&self) -> usize {
        self.removed.iter().map(|(_, n)| n).sum()
    }

    pub fn removed_from(&self, kind: EntityKind) -> usize {
        self.removed
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, n)| n)
            .sum()
    }
}

/// One step of the transform chain. Takes ownership of the datasets and
/// hands back the next generation.
pub trait Transform: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, datasets: FdcDatasets) -> Result<(FdcDatasets, TransformReport)>;
}
