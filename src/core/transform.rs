use crate::domain::model::{
    BrandedFood, EntityKind, FdcDatasets, Food, FoodNutrient, FoodPortion,
};
use crate::domain::ports::{Keyed, References, Transform, TransformReport};
use crate::utils::error::Result;
use std::collections::HashSet;
use std::time::Instant;

impl Keyed for Food {
    fn key(&self) -> i64 {
        self.fdc_id
    }
}

impl References for FoodNutrient {
    fn foreign_key(&self) -> i64 {
        self.fdc_id
    }
}

impl References for FoodPortion {
    fn foreign_key(&self) -> i64 {
        self.fdc_id
    }
}

impl References for BrandedFood {
    fn foreign_key(&self) -> i64 {
        self.fdc_id
    }
}

/// Membership set of authoritative keys.
#[derive(Debug, Clone, Default)]
pub struct KeySet(HashSet<i64>);

impl KeySet {
    pub fn from_keyed<T: Keyed>(records: &[T]) -> Self {
        let mut keys = HashSet::with_capacity(records.len());
        keys.extend(records.iter().map(Keyed::key));
        Self(keys)
    }

    pub fn contains(&self, key: i64) -> bool {
        self.0.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Drops records whose foreign key is not in `keys`, keeping the order of
/// the survivors. Returns how many were removed.
pub fn retain_referenced<T: References>(keys: &KeySet, records: &mut Vec<T>) -> usize {
    let before = records.len();
    records.retain(|record| keys.contains(record.foreign_key()));
    before - records.len()
}

/// Removes nutrient, portion and branded rows whose `fdc_id` names a food
/// that did not make it into the master food list.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidFdcIdTransform;

impl Transform for ValidFdcIdTransform {
    fn name(&self) -> &'static str {
        "valid_fdc_id"
    }

    fn apply(&self, mut datasets: FdcDatasets) -> Result<(FdcDatasets, TransformReport)> {
        let started = Instant::now();
        let valid_ids = KeySet::from_keyed(&datasets.foods);

        let removed = vec![
            (
                EntityKind::FoodNutrient,
                retain_referenced(&valid_ids, &mut datasets.food_nutrients),
            ),
            (
                EntityKind::FoodPortion,
                retain_referenced(&valid_ids, &mut datasets.food_portions),
            ),
            (
                EntityKind::BrandedFood,
                retain_referenced(&valid_ids, &mut datasets.branded_foods),
            ),
        ];

        let report = TransformReport {
            transform: self.name(),
            removed,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            "Valid FDC ID transform removed {} orphaned entries in {:?}",
            report.total_removed(),
            report.elapsed
        );
        for (kind, count) in report.removed.iter().filter(|(_, n)| *n > 0) {
            tracing::debug!("Removed {} {} entries", count, kind);
        }

        Ok((datasets, report))
    }
}

/// Transforms applied in order, each receiving the previous one's output.
pub struct TransformChain {
    steps: Vec<Box<dyn Transform>>,
}

impl Default for TransformChain {
    fn default() -> Self {
        Self::new(vec![Box::new(ValidFdcIdTransform)])
    }
}

impl TransformChain {
    pub fn new(steps: Vec<Box<dyn Transform>>) -> Self {
        Self { steps }
    }

    pub fn then(mut self, step: impl Transform + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn apply_all(&self, datasets: FdcDatasets) -> Result<(FdcDatasets, Vec<TransformReport>)> {
        let mut reports = Vec::with_capacity(self.steps.len());
        let mut current = datasets;

        for step in &self.steps {
            tracing::debug!("Applying transform {}", step.name());
            let (next, report) = step.apply(current)?;
            reports.push(report);
            current = next;
        }

        Ok((current, reports))
    }
}
