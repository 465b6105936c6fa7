use super::Store;
use crate::domain::ports::TableRecord;
use crate::utils::error::{EtlError, Result};
use serde::Serialize;
use std::time::{Duration, Instant};

pub const DEFAULT_BATCH_SIZE: usize = 10_000;

#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub table: &'static str,
    pub rows_total: usize,
    pub rows_inserted: usize,
    pub batches_committed: usize,
    #[serde(with = "crate::utils::duration_ms")]
    pub elapsed: Duration,
}

/// Writes datasets through one prepared INSERT, committing every
/// `batch_size` rows. A batch is the unit of atomicity.
#[derive(Debug, Clone)]
pub struct BatchLoader {
    batch_size: usize,
}

impl Default for BatchLoader {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl BatchLoader {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn load<T: TableRecord>(&self, store: &Store, records: &[T]) -> Result<LoadReport> {
        let table = T::ENTITY.table();

        if !store.is_initialized() {
            return Err(EtlError::StoreNotInitialized {
                table: table.to_string(),
            });
        }
        if records.is_empty() {
            return Err(EtlError::EmptyDataset {
                table: table.to_string(),
            });
        }

        let started = Instant::now();
        let conn = store.connection();
        let rows_total = records.len();

        // Dropped, and so finalized, on every return below.
        let mut stmt = conn
            .prepare(&insert_statement(table, T::COLUMNS))
            .map_err(|e| log_store_error(format!("preparing insert into {}", table), e))?;

        let mut rows_inserted = 0;
        let mut batches_committed = 0;

        for batch in records.chunks(self.batch_size) {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| log_store_error(format!("beginning transaction on {}", table), e))?;

            for (offset, record) in batch.iter().enumerate() {
                if let Err(err) = stmt.execute(&*record.sql_params()) {
                    let failed = EtlError::BatchInsertError {
                        table: table.to_string(),
                        row: rows_inserted + offset + 1,
                        committed_rows: rows_inserted,
                        code: err.sqlite_error().map(|e| e.extended_code),
                        message: err.to_string(),
                    };
                    tracing::error!("{}", failed);

                    if let Err(rollback) = tx.rollback() {
                        tracing::error!("Rolling back {} batch failed: {}", table, rollback);
                    } else {
                        tracing::warn!(
                            "Rolled back {} uncommitted {} rows",
                            offset,
                            table
                        );
                    }
                    return Err(failed);
                }
            }

            tx.commit()
                .map_err(|e| log_store_error(format!("committing batch into {}", table), e))?;

            rows_inserted += batch.len();
            batches_committed += 1;
            tracing::info!(
                "Inserted {} of {} {} records",
                rows_inserted,
                rows_total,
                table
            );
        }

        let report = LoadReport {
            table,
            rows_total,
            rows_inserted,
            batches_committed,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            "Loaded {} {} records in {} batches ({:?})",
            report.rows_inserted,
            table,
            report.batches_committed,
            report.elapsed
        );

        Ok(report)
    }
}

fn log_store_error(context: String, err: rusqlite::Error) -> EtlError {
    let err = EtlError::store(context, err);
    tracing::error!("{}", err);
    err
}

fn insert_statement(table: &str, columns: &[&str]) -> String {
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::schema::SchemaManager;
    use crate::domain::model::{FoodNutrient, MeasureUnit};

    fn initialized_store() -> Store {
        let mut store = Store::open_in_memory().unwrap();
        SchemaManager::fdc().ensure_schema(&mut store).unwrap();
        store
    }

    fn units(count: usize) -> Vec<MeasureUnit> {
        (1..=count as i64)
            .map(|id| MeasureUnit {
                id,
                name: format!("unit {}", id),
            })
            .collect()
    }

    #[test]
    fn test_insert_statement_uses_positional_placeholders() {
        assert_eq!(
            insert_statement("measure_units", &["id", "name"]),
            "INSERT INTO measure_units (id, name) VALUES (?, ?)"
        );
    }

    #[test]
    fn test_batches_of_ten_thousand() {
        let store = initialized_store();
        let loader = BatchLoader::new(10_000);

        let report = loader.load(&store, &units(25_000)).unwrap();

        assert_eq!(report.batches_committed, 3);
        assert_eq!(report.rows_inserted, 25_000);
        assert_eq!(store.row_count("measure_units").unwrap(), 25_000);
        assert!(store.connection().is_autocommit());
    }

    #[test]
    fn test_failed_row_rolls_back_only_its_batch() {
        let store = initialized_store();
        let loader = BatchLoader::new(10_000);
        let mut records = units(25_000);
        // Duplicate primary key in the second batch
        records[14_999].id = 1;

        let err = loader.load(&store, &records).unwrap_err();

        match err {
            EtlError::BatchInsertError {
                table,
                row,
                committed_rows,
                code,
                ..
            } => {
                assert_eq!(table, "measure_units");
                assert_eq!(row, 15_000);
                assert_eq!(committed_rows, 10_000);
                assert_eq!(code.map(|c| c & 0xff), Some(19)); // SQLITE_CONSTRAINT
            }
            other => panic!("unexpected error: {:?}", other),
        }

        assert_eq!(store.row_count("measure_units").unwrap(), 10_000);
        let max_id: i64 = store
            .connection()
            .query_row("SELECT MAX(id) FROM measure_units", [], |r| r.get(0))
            .unwrap();
        assert_eq!(max_id, 10_000);
        assert!(store.connection().is_autocommit());
    }

    #[test]
    fn test_refuses_empty_dataset() {
        let store = initialized_store();

        let err = BatchLoader::default()
            .load::<MeasureUnit>(&store, &[])
            .unwrap_err();

        assert!(matches!(err, EtlError::EmptyDataset { .. }));
    }

    #[test]
    fn test_refuses_uninitialized_store() {
        let store = Store::open_in_memory().unwrap();

        let err = BatchLoader::default().load(&store, &units(3)).unwrap_err();

        assert!(matches!(err, EtlError::StoreNotInitialized { .. }));
        assert!(store.table_names().unwrap().is_empty());
    }

    #[test]
    fn test_absent_optional_fields_are_stored_as_null() {
        let store = initialized_store();
        let record = FoodNutrient {
            id: 1,
            fdc_id: 167512,
            nutrient_id: 1003,
            amount: None,
            data_points: Some(3),
            derivation_id: None,
            min: None,
            max: None,
            median: None,
            loq: None,
            footnote: None,
            min_year_acquired: None,
            percent_daily_value: None,
        };

        BatchLoader::default().load(&store, &[record]).unwrap();

        let (amount, data_points): (Option<f64>, Option<i64>) = store
            .connection()
            .query_row(
                "SELECT amount, data_points FROM food_nutrients WHERE id = 1",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(amount, None);
        assert_eq!(data_points, Some(3));
    }

    #[test]
    fn test_zero_batch_size_is_clamped() {
        assert_eq!(BatchLoader::new(0).batch_size(), 1);
    }
}
