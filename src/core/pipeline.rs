use crate::adapters::csv_extractor::ExtractStats;
use crate::adapters::sqlite::loader::{BatchLoader, LoadReport};
use crate::adapters::sqlite::schema::{SchemaManager, SchemaReport};
use crate::adapters::sqlite::Store;
use crate::core::extract::{ExtractionCoordinator, ExtractionReport, SourceMap};
use crate::core::transform::TransformChain;
use crate::core::{ConfigProvider, Pipeline};
use crate::domain::model::FdcDatasets;
use crate::domain::ports::{TableRecord, TransformReport};
use crate::utils::error::{EtlError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub sources: SourceMap,
    pub database_path: PathBuf,
    pub batch_size: usize,
}

impl PipelineSettings {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Ok(Self {
            sources: SourceMap::resolve(config.source_locations())?,
            database_path: PathBuf::from(config.database_path()),
            batch_size: config.batch_size(),
        })
    }
}

pub struct Extraction {
    pub datasets: FdcDatasets,
    pub report: ExtractionReport,
}

pub struct Transformation {
    pub datasets: FdcDatasets,
    pub reports: Vec<TransformReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadSummary {
    pub database: PathBuf,
    pub schema: SchemaReport,
    pub tables: Vec<LoadReport>,
    /// Tables left untouched because their dataset was empty.
    pub skipped_empty: Vec<&'static str>,
}

impl LoadSummary {
    pub fn rows_inserted(&self) -> usize {
        self.tables.iter().map(|t| t.rows_inserted).sum()
    }
}

/// USDA FoodData Central CSV export into a SQLite database.
pub struct FdcPipeline {
    settings: PipelineSettings,
    transforms: TransformChain,
}

impl FdcPipeline {
    pub fn new(settings: PipelineSettings) -> Self {
        Self {
            settings,
            transforms: TransformChain::default(),
        }
    }

    pub fn with_transforms(mut self, transforms: TransformChain) -> Self {
        self.transforms = transforms;
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }
}

#[async_trait::async_trait]
impl Pipeline for FdcPipeline {
    type Extracted = Extraction;
    type Transformed = Transformation;
    type Loaded = LoadSummary;

    async fn extract(&self) -> Result<Extraction> {
        let coordinator = ExtractionCoordinator::new(self.settings.sources.clone());
        let (datasets, report) = coordinator.extract_all().await?;

        for ExtractStats {
            entity,
            rows_skipped,
            ..
        } in report.entities.iter().filter(|s| s.rows_skipped > 0)
        {
            tracing::warn!("⚠️ Skipped {} malformed {} rows", rows_skipped, entity);
        }

        Ok(Extraction { datasets, report })
    }

    async fn transform(&self, data: Extraction) -> Result<Transformation> {
        let (datasets, reports) = self.transforms.apply_all(data.datasets)?;
        Ok(Transformation { datasets, reports })
    }

    async fn load(&self, data: Transformation) -> Result<LoadSummary> {
        let database = self.settings.database_path.clone();
        let loader = BatchLoader::new(self.settings.batch_size);

        // rusqlite is synchronous; keep it off the async workers.
        tokio::task::spawn_blocking(move || load_into_store(&database, &loader, data.datasets))
            .await
            .map_err(|join_err| EtlError::StoreError {
                context: "running the load task".to_string(),
                code: None,
                message: join_err.to_string(),
            })?
    }
}

/// Opens the store, ensures the schema, then loads every dataset in
/// dependency order, one at a time on the same connection.
pub fn load_into_store(
    database: &Path,
    loader: &BatchLoader,
    datasets: FdcDatasets,
) -> Result<LoadSummary> {
    let mut store = Store::open(database)?;
    let schema = SchemaManager::fdc().ensure_schema(&mut store)?;

    let mut summary = LoadSummary {
        database: database.to_path_buf(),
        schema,
        tables: Vec::new(),
        skipped_empty: Vec::new(),
    };

    let FdcDatasets {
        food_categories,
        measure_units,
        nutrients,
        food_portions,
        foods,
        branded_foods,
        food_nutrients,
    } = datasets;

    // Same order as EntityKind::LOAD_ORDER.
    load_dataset(&store, loader, food_categories, &mut summary)?;
    load_dataset(&store, loader, measure_units, &mut summary)?;
    load_dataset(&store, loader, nutrients, &mut summary)?;
    load_dataset(&store, loader, foods, &mut summary)?;
    load_dataset(&store, loader, branded_foods, &mut summary)?;
    load_dataset(&store, loader, food_nutrients, &mut summary)?;
    load_dataset(&store, loader, food_portions, &mut summary)?;

    Ok(summary)
}

/// Takes the dataset by value so it is freed as soon as it is persisted.
fn load_dataset<T: TableRecord>(
    store: &Store,
    loader: &BatchLoader,
    records: Vec<T>,
    summary: &mut LoadSummary,
) -> Result<()> {
    let table = T::ENTITY.table();
    if records.is_empty() {
        tracing::warn!("No {} records to load; skipping {}", T::ENTITY, table);
        summary.skipped_empty.push(table);
        return Ok(());
    }

    let report = loader.load(store, &records)?;
    drop(records);
    summary.tables.push(report);
    Ok(())
}
