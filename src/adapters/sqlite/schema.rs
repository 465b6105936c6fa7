use super::Store;
use crate::domain::model::{
    BrandedFood, Food, FoodCategory, FoodNutrient, FoodPortion, MeasureUnit, Nutrient,
};
use crate::domain::ports::TableRecord;
use crate::utils::error::{EtlError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub name: &'static str,
    pub ddl: &'static str,
}

impl TableSpec {
    pub fn of<T: TableRecord>() -> Self {
        Self {
            name: T::ENTITY.table(),
            ddl: T::CREATE_TABLE,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaReport {
    pub created: Vec<&'static str>,
    pub existing: Vec<&'static str>,
}

/// Creates the fixed, versionless table layout. Existing tables are left
/// untouched: never dropped, never altered.
pub struct SchemaManager {
    tables: Vec<TableSpec>,
}

impl SchemaManager {
    pub fn new(tables: Vec<TableSpec>) -> Self {
        Self { tables }
    }

    /// Every FoodData Central table, parents first.
    pub fn fdc() -> Self {
        Self::new(vec![
            TableSpec::of::<FoodCategory>(),
            TableSpec::of::<MeasureUnit>(),
            TableSpec::of::<Nutrient>(),
            TableSpec::of::<Food>(),
            TableSpec::of::<BrandedFood>(),
            TableSpec::of::<FoodNutrient>(),
            TableSpec::of::<FoodPortion>(),
        ])
    }

    pub fn tables(&self) -> &[TableSpec] {
        &self.tables
    }

    pub fn ensure_schema(&self, store: &mut Store) -> Result<SchemaReport> {
        let mut report = SchemaReport::default();

        for table in &self.tables {
            if store.table_exists(table.name)? {
                tracing::debug!("Table {} already exists", table.name);
                report.existing.push(table.name);
                continue;
            }

            store
                .connection()
                .execute_batch(table.ddl)
                .map_err(|e| {
                    let err = EtlError::store(format!("creating table {}", table.name), e);
                    tracing::error!("{}", err);
                    err
                })?;

            tracing::info!("Created table {}", table.name);
            report.created.push(table.name);
        }

        store.mark_initialized();
        Ok(report)
    }
}
