use crate::adapters::csv_extractor::{CsvExtractor, ExtractStats, Extracted};
use crate::domain::model::{
    BrandedFood, EntityKind, FdcDatasets, Food, FoodCategory, FoodNutrient, FoodPortion,
    MeasureUnit, Nutrient,
};
use crate::domain::ports::CsvRecord;
use crate::utils::error::{EtlError, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Input file per entity, resolved before any extraction starts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceMap {
    paths: BTreeMap<EntityKind, PathBuf>,
}

impl SourceMap {
    /// Resolves `<entity>_input_file` keys; every entity must be present.
    pub fn resolve(locations: &HashMap<String, String>) -> Result<Self> {
        let mut paths = BTreeMap::new();

        for kind in EntityKind::BY_EXPECTED_SIZE {
            let key = kind.config_key();
            match locations.get(&key) {
                Some(path) => {
                    paths.insert(kind, PathBuf::from(path));
                }
                None => {
                    let mut available: Vec<&str> = locations.keys().map(String::as_str).collect();
                    available.sort_unstable();
                    return Err(EtlError::MissingConfigError {
                        field: key,
                        available: available.join(", "),
                    });
                }
            }
        }

        Ok(Self { paths })
    }

    pub fn insert(&mut self, kind: EntityKind, path: impl Into<PathBuf>) {
        self.paths.insert(kind, path.into());
    }

    pub fn path(&self, kind: EntityKind) -> Option<&Path> {
        self.paths.get(&kind).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, &Path)> {
        self.paths.iter().map(|(kind, path)| (*kind, path.as_path()))
    }

    fn require(&self, kind: EntityKind) -> Result<PathBuf> {
        self.paths
            .get(&kind)
            .cloned()
            .ok_or_else(|| EtlError::MissingConfigError {
                field: kind.config_key(),
                available: self
                    .paths
                    .keys()
                    .map(EntityKind::config_key)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    pub entities: Vec<ExtractStats>,
    /// Wall-clock time across all concurrent extractions.
    #[serde(with = "crate::utils::duration_ms")]
    pub elapsed: Duration,
}

impl ExtractionReport {
    pub fn stats_for(&self, kind: EntityKind) -> Option<&ExtractStats> {
        self.entities.iter().find(|s| s.entity == kind)
    }

    pub fn rows_skipped(&self) -> usize {
        self.entities.iter().map(|s| s.rows_skipped).sum()
    }
}

/// A running extraction whose result has not been collected yet.
struct PendingExtraction<T> {
    entity: EntityKind,
    handle: JoinHandle<Result<Extracted<T>>>,
}

impl<T: CsvRecord> PendingExtraction<T> {
    fn spawn(path: PathBuf) -> Self {
        let handle = tokio::task::spawn_blocking(move || CsvExtractor::<T>::new(path).extract());
        Self {
            entity: T::ENTITY,
            handle,
        }
    }

    async fn settle(self) -> Result<Extracted<T>> {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(join_err) => Err(EtlError::ExtractionTask {
                entity: self.entity,
                message: join_err.to_string(),
            }),
        }
    }
}

/// Collected results and the first failure, if any, across all extractions.
#[derive(Default)]
struct Collected {
    stats: Vec<ExtractStats>,
    first_error: Option<EtlError>,
}

impl Collected {
    fn take<T>(&mut self, outcome: Result<Extracted<T>>) -> Vec<T> {
        match outcome {
            Ok(extracted) => {
                tracing::info!(
                    "Parsed {} {} entries",
                    extracted.records.len(),
                    extracted.stats.entity
                );
                self.stats.push(extracted.stats);
                extracted.records
            }
            Err(err) => {
                tracing::error!("❌ {}", err);
                if self.first_error.is_none() {
                    self.first_error = Some(err);
                }
                Vec::new()
            }
        }
    }
}

/// Fans out one blocking extraction task per entity and joins all of them.
pub struct ExtractionCoordinator {
    sources: SourceMap,
}

impl ExtractionCoordinator {
    pub fn new(sources: SourceMap) -> Self {
        Self { sources }
    }

    pub async fn extract_all(&self) -> Result<(FdcDatasets, ExtractionReport)> {
        // Resolve every path before launching anything.
        let category_path = self.sources.require(EntityKind::FoodCategory)?;
        let measure_unit_path = self.sources.require(EntityKind::MeasureUnit)?;
        let nutrient_path = self.sources.require(EntityKind::Nutrient)?;
        let food_portion_path = self.sources.require(EntityKind::FoodPortion)?;
        let food_path = self.sources.require(EntityKind::Food)?;
        let branded_food_path = self.sources.require(EntityKind::BrandedFood)?;
        let food_nutrient_path = self.sources.require(EntityKind::FoodNutrient)?;

        let started = Instant::now();
        tracing::info!("Launching {} extraction tasks", EntityKind::BY_EXPECTED_SIZE.len());

        let categories = PendingExtraction::<FoodCategory>::spawn(category_path);
        let measure_units = PendingExtraction::<MeasureUnit>::spawn(measure_unit_path);
        let nutrients = PendingExtraction::<Nutrient>::spawn(nutrient_path);
        let food_portions = PendingExtraction::<FoodPortion>::spawn(food_portion_path);
        let foods = PendingExtraction::<Food>::spawn(food_path);
        let branded_foods = PendingExtraction::<BrandedFood>::spawn(branded_food_path);
        let food_nutrients = PendingExtraction::<FoodNutrient>::spawn(food_nutrient_path);

        // Smallest first, so the big datasets are the last to be handed over.
        let mut collected = Collected::default();
        let datasets = FdcDatasets {
            food_categories: collected.take(categories.settle().await),
            measure_units: collected.take(measure_units.settle().await),
            nutrients: collected.take(nutrients.settle().await),
            food_portions: collected.take(food_portions.settle().await),
            foods: collected.take(foods.settle().await),
            branded_foods: collected.take(branded_foods.settle().await),
            food_nutrients: collected.take(food_nutrients.settle().await),
        };

        if let Some(err) = collected.first_error {
            return Err(err);
        }

        let report = ExtractionReport {
            entities: collected.stats,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            "Time taken to parse all entries ({}): {:?}",
            datasets.total_records(),
            report.elapsed
        );

        Ok((datasets, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const FIXTURES: [(EntityKind, &str); 7] = [
        (
            EntityKind::FoodCategory,
            "id,code,description\n1,0100,Dairy and Egg Products\n",
        ),
        (EntityKind::MeasureUnit, "id,name\n1000,cup\n1001,tbsp\n"),
        (
            EntityKind::Nutrient,
            "id,name,unit_name,nutrient_nbr,rank\n1003,Protein,G,203,600\n",
        ),
        (
            EntityKind::FoodPortion,
            "id,fdc_id,seq_num,amount,measure_unit_id,portion_description,modifier,gram_weight,data_points,footnote,min_year_acquired\n\
             81,1,1,1.0,1000,,,246,,,\n",
        ),
        (
            EntityKind::Food,
            "fdc_id,data_type,description,food_category_id,publication_date\n\
             1,foundation_food,Hummus,16,2019-04-01\n\
             2,sample_food,Hummus sample,16,2019-04-01\n",
        ),
        (
            EntityKind::BrandedFood,
            "fdc_id,brand_owner\n1,Acme\n",
        ),
        (
            EntityKind::FoodNutrient,
            "id,fdc_id,nutrient_id,amount\n10,1,1003,7.9\n11,2,1003,8.1\n",
        ),
    ];

    fn write_sources(dir: &TempDir) -> HashMap<String, String> {
        let mut locations = HashMap::new();
        for (kind, content) in FIXTURES {
            let path = dir.path().join(format!("{}.csv", kind.as_str()));
            fs::write(&path, content).unwrap();
            locations.insert(kind.config_key(), path.to_string_lossy().into_owned());
        }
        locations
    }

    #[test]
    fn test_resolve_reports_missing_key_and_available_keys() {
        let mut locations = HashMap::new();
        locations.insert("food_input_file".to_string(), "food.csv".to_string());

        let err = SourceMap::resolve(&locations).unwrap_err();

        match err {
            EtlError::MissingConfigError { field, available } => {
                assert_eq!(field, "food_category_input_file");
                assert_eq!(available, "food_input_file");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_extract_all_collects_every_entity() {
        let dir = TempDir::new().unwrap();
        let sources = SourceMap::resolve(&write_sources(&dir)).unwrap();

        let (datasets, report) = ExtractionCoordinator::new(sources)
            .extract_all()
            .await
            .unwrap();

        let counts = datasets.counts();
        assert_eq!(counts[&EntityKind::FoodCategory], 1);
        assert_eq!(counts[&EntityKind::MeasureUnit], 2);
        assert_eq!(counts[&EntityKind::Food], 1);
        assert_eq!(counts[&EntityKind::FoodNutrient], 2);
        assert_eq!(report.entities.len(), 7);
        assert_eq!(
            report.stats_for(EntityKind::Food).unwrap().rows_filtered,
            1
        );
        // Collection order is smallest expected dataset first.
        let order: Vec<EntityKind> = report.entities.iter().map(|s| s.entity).collect();
        assert_eq!(order, EntityKind::BY_EXPECTED_SIZE.to_vec());
    }

    #[tokio::test]
    async fn test_missing_source_fails_the_whole_extraction() {
        let dir = TempDir::new().unwrap();
        let mut locations = write_sources(&dir);
        locations.insert(
            EntityKind::Nutrient.config_key(),
            dir.path().join("gone.csv").to_string_lossy().into_owned(),
        );
        let sources = SourceMap::resolve(&locations).unwrap();

        let err = ExtractionCoordinator::new(sources)
            .extract_all()
            .await
            .unwrap_err();

        match err {
            EtlError::SourceUnavailable { entity, .. } => {
                assert_eq!(entity, EntityKind::Nutrient)
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_first_failure_in_collection_order_wins() {
        let dir = TempDir::new().unwrap();
        let mut locations = write_sources(&dir);
        for kind in [EntityKind::FoodNutrient, EntityKind::MeasureUnit] {
            locations.insert(
                kind.config_key(),
                dir.path().join("missing").to_string_lossy().into_owned(),
            );
        }
        let sources = SourceMap::resolve(&locations).unwrap();

        let err = ExtractionCoordinator::new(sources)
            .extract_all()
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            EtlError::SourceUnavailable {
                entity: EntityKind::MeasureUnit,
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_elapsed_is_wall_clock_not_sum_of_tasks() {
        let dir = TempDir::new().unwrap();
        let mut locations = HashMap::new();
        for (kind, _) in FIXTURES {
            let path = dir.path().join(format!("{}.csv", kind.as_str()));
            let status = std::process::Command::new("mkfifo")
                .arg(&path)
                .status()
                .unwrap();
            assert!(status.success());
            locations.insert(kind.config_key(), path.to_string_lossy().into_owned());
        }
        let sources = SourceMap::resolve(&locations).unwrap();

        // Each reader blocks on open until the writer reaches its pipe.
        let feed_dir = dir.path().to_path_buf();
        let feeder = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(150));
            for (kind, content) in FIXTURES {
                fs::write(feed_dir.join(format!("{}.csv", kind.as_str())), content).unwrap();
            }
        });

        let (datasets, report) = ExtractionCoordinator::new(sources)
            .extract_all()
            .await
            .unwrap();
        feeder.join().unwrap();

        let summed: Duration = report.entities.iter().map(|s| s.elapsed).sum();
        assert_eq!(datasets.counts()[&EntityKind::MeasureUnit], 2);
        assert!(report.elapsed >= Duration::from_millis(150));
        assert!(
            report.elapsed * 3 < summed,
            "elapsed {:?} vs summed {:?}",
            report.elapsed,
            summed
        );
    }
}
