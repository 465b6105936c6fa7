use crate::domain::model::{
    BrandedFood, EntityKind, Food, FoodCategory, FoodDataType, FoodNutrient, FoodPortion,
    MeasureUnit, Nutrient,
};
use crate::domain::ports::CsvRecord;
use crate::utils::error::{EtlError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize)]
pub struct ExtractStats {
    pub entity: EntityKind,
    pub rows_read: usize,
    /// Malformed rows dropped with a diagnostic.
    pub rows_skipped: usize,
    /// Well-formed rows dropped as out of scope.
    pub rows_filtered: usize,
    #[serde(with = "crate::utils::duration_ms")]
    pub elapsed: Duration,
}

impl ExtractStats {
    pub fn rows_kept(&self) -> usize {
        self.rows_read - self.rows_skipped - self.rows_filtered
    }
}

#[derive(Debug)]
pub struct Extracted<T> {
    pub records: Vec<T>,
    pub stats: ExtractStats,
}

/// Reads one entity's CSV file into memory in a single pass.
pub struct CsvExtractor<T: CsvRecord> {
    path: PathBuf,
    _record: PhantomData<fn() -> T>,
}

impl<T: CsvRecord> CsvExtractor<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn extract(&self) -> Result<Extracted<T>> {
        let started = Instant::now();
        let entity = T::ENTITY;

        let file = File::open(&self.path).map_err(|source| EtlError::SourceUnavailable {
            entity,
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!("Reading {} rows from {}", entity, self.path.display());

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(BufReader::new(file));

        let headers = reader.headers().map_err(|e| self.unreadable(e))?.clone();
        let scope_index =
            T::SCOPE_COLUMN.and_then(|column| headers.iter().position(|h| h == column));

        let mut records = Vec::new();
        let mut rows_read = 0;
        let mut rows_skipped = 0;
        let mut rows_filtered = 0;

        for (index, raw) in reader.records().enumerate() {
            rows_read += 1;
            let row = raw.and_then(|raw| {
                if let Some(i) = scope_index {
                    if !T::in_scope(raw.get(i).unwrap_or_default()) {
                        return Ok(None);
                    }
                }
                raw.deserialize::<T::Row>(Some(&headers)).map(Some)
            });

            match row {
                Ok(Some(row)) => match T::from_row(row) {
                    Some(record) => records.push(record),
                    None => rows_filtered += 1,
                },
                Ok(None) => rows_filtered += 1,
                Err(err) => {
                    let line = err
                        .position()
                        .map(|p| p.line())
                        .unwrap_or(index as u64 + 2);
                    if let csv::ErrorKind::Io(_) = err.kind() {
                        return Err(self.unreadable(err));
                    }
                    rows_skipped += 1;
                    tracing::warn!(
                        "Skipping malformed {} row at line {}: {}",
                        entity,
                        line,
                        err
                    );
                }
            }
        }

        records.shrink_to_fit();

        let stats = ExtractStats {
            entity,
            rows_read,
            rows_skipped,
            rows_filtered,
            elapsed: started.elapsed(),
        };

        tracing::debug!(
            "Parsed {} {} entries ({} skipped, {} filtered) in {:?}",
            records.len(),
            entity,
            rows_skipped,
            rows_filtered,
            stats.elapsed
        );

        Ok(Extracted { records, stats })
    }

    fn unreadable(&self, err: csv::Error) -> EtlError {
        match err.into_kind() {
            csv::ErrorKind::Io(source) => EtlError::SourceUnavailable {
                entity: T::ENTITY,
                path: self.path.clone(),
                source,
            },
            kind => EtlError::ExtractionTask {
                entity: T::ENTITY,
                message: format!("{:?}", kind),
            },
        }
    }
}

/// `food.csv` row; `data_type` decides whether the row enters the master list.
#[derive(Debug, Deserialize)]
pub struct FoodRow {
    fdc_id: i64,
    data_type: String,
    description: String,
    food_category_id: Option<String>,
    publication_date: NaiveDate,
}

impl CsvRecord for Food {
    const ENTITY: EntityKind = EntityKind::Food;
    const SCOPE_COLUMN: Option<&'static str> = Some("data_type");
    type Row = FoodRow;

    fn in_scope(data_type: &str) -> bool {
        FoodDataType::from_code(data_type).is_some()
    }

    fn from_row(row: FoodRow) -> Option<Self> {
        let data_type = FoodDataType::from_code(&row.data_type)?;
        Some(Food {
            fdc_id: row.fdc_id,
            data_type,
            description: row.description,
            food_category_id: row.food_category_id,
            publication_date: row.publication_date,
        })
    }
}

macro_rules! csv_record_as_is {
    ($($ty:ty => $kind:expr),* $(,)?) => {
        $(
            impl CsvRecord for $ty {
                const ENTITY: EntityKind = $kind;
                type Row = $ty;

                fn from_row(row: $ty) -> Option<Self> {
                    Some(row)
                }
            }
        )*
    };
}

csv_record_as_is! {
    BrandedFood => EntityKind::BrandedFood,
    FoodCategory => EntityKind::FoodCategory,
    MeasureUnit => EntityKind::MeasureUnit,
    Nutrient => EntityKind::Nutrient,
    FoodNutrient => EntityKind::FoodNutrient,
    FoodPortion => EntityKind::FoodPortion,
}
