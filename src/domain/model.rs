use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The USDA FoodData Central tables handled by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    FoodCategory,
    MeasureUnit,
    Nutrient,
    FoodPortion,
    Food,
    BrandedFood,
    FoodNutrient,
}

impl EntityKind {
    /// Ordered from the smallest expected dataset to the largest.
    pub const BY_EXPECTED_SIZE: [EntityKind; 7] = [
        EntityKind::FoodCategory,
        EntityKind::MeasureUnit,
        EntityKind::Nutrient,
        EntityKind::FoodPortion,
        EntityKind::Food,
        EntityKind::BrandedFood,
        EntityKind::FoodNutrient,
    ];

    /// Parents before the tables that reference them.
    pub const LOAD_ORDER: [EntityKind; 7] = [
        EntityKind::FoodCategory,
        EntityKind::MeasureUnit,
        EntityKind::Nutrient,
        EntityKind::Food,
        EntityKind::BrandedFood,
        EntityKind::FoodNutrient,
        EntityKind::FoodPortion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::FoodCategory => "food_category",
            EntityKind::MeasureUnit => "measure_unit",
            EntityKind::Nutrient => "nutrient",
            EntityKind::FoodPortion => "food_portion",
            EntityKind::Food => "food",
            EntityKind::BrandedFood => "branded_food",
            EntityKind::FoodNutrient => "food_nutrient",
        }
    }

    /// Key naming this entity's input file in the source configuration.
    pub fn config_key(&self) -> String {
        format!("{}_input_file", self.as_str())
    }

    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::FoodCategory => "food_categories",
            EntityKind::MeasureUnit => "measure_units",
            EntityKind::Nutrient => "nutrients",
            EntityKind::FoodPortion => "food_portions",
            EntityKind::Food => "foods",
            EntityKind::BrandedFood => "branded_foods",
            EntityKind::FoodNutrient => "food_nutrients",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoodDataType {
    #[serde(rename = "foundation_food")]
    Foundation,
    #[serde(rename = "branded_food")]
    Branded,
}

impl FoodDataType {
    /// Only foundation and branded foods enter the master food list.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "foundation_food" => Some(FoodDataType::Foundation),
            "branded_food" => Some(FoodDataType::Branded),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            FoodDataType::Foundation => "foundation_food",
            FoodDataType::Branded => "branded_food",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub fdc_id: i64,
    pub data_type: FoodDataType,
    pub description: String,
    pub food_category_id: Option<String>,
    pub publication_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandedFood {
    pub fdc_id: i64,
    pub brand_owner: Option<String>,
    pub brand_name: Option<String>,
    pub subbrand_name: Option<String>,
    pub gtin_upc: Option<String>,
    pub ingredients: Option<String>,
    pub not_a_significant_source_of: Option<String>,
    pub serving_size: Option<f64>,
    pub serving_size_unit: Option<String>,
    pub household_serving_fulltext: Option<String>,
    pub branded_food_category: Option<String>,
    pub data_source: Option<String>,
    pub package_weight: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub modified_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub available_date: Option<NaiveDate>,
    pub market_country: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub discontinued_date: Option<NaiveDate>,
    pub preparation_state_code: Option<String>,
    pub trade_channel: Option<String>,
    pub short_description: Option<String>,
    pub material_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodCategory {
    pub id: i64,
    pub code: i64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureUnit {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nutrient {
    pub id: i64,
    pub name: String,
    pub unit_name: String,
    pub nutrient_nbr: Option<String>,
    pub rank: Option<f64>,
}

/// Amount of one nutrient in 100g of one food.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodNutrient {
    pub id: i64,
    pub fdc_id: i64,
    pub nutrient_id: i64,
    pub amount: Option<f64>,
    pub data_points: Option<i64>,
    pub derivation_id: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub median: Option<f64>,
    pub loq: Option<f64>,
    pub footnote: Option<String>,
    pub min_year_acquired: Option<i64>,
    pub percent_daily_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodPortion {
    pub id: i64,
    pub fdc_id: i64,
    pub seq_num: Option<i64>,
    pub amount: Option<f64>,
    pub measure_unit_id: Option<i64>,
    pub portion_description: Option<String>,
    pub modifier: Option<String>,
    pub gram_weight: Option<f64>,
    pub data_points: Option<i64>,
    pub footnote: Option<String>,
    pub min_year_acquired: Option<i64>,
}

/// One generation of every dataset, handed from stage to stage by value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FdcDatasets {
    pub food_categories: Vec<FoodCategory>,
    pub measure_units: Vec<MeasureUnit>,
    pub nutrients: Vec<Nutrient>,
    pub food_portions: Vec<FoodPortion>,
    pub foods: Vec<Food>,
    pub branded_foods: Vec<BrandedFood>,
    pub food_nutrients: Vec<FoodNutrient>,
}

impl FdcDatasets {
    pub fn len_of(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::FoodCategory => self.food_categories.len(),
            EntityKind::MeasureUnit => self.measure_units.len(),
            EntityKind::Nutrient => self.nutrients.len(),
            EntityKind::FoodPortion => self.food_portions.len(),
            EntityKind::Food => self.foods.len(),
            EntityKind::BrandedFood => self.branded_foods.len(),
            EntityKind::FoodNutrient => self.food_nutrients.len(),
        }
    }

    pub fn counts(&self) -> BTreeMap<EntityKind, usize> {
        EntityKind::BY_EXPECTED_SIZE
            .iter()
            .map(|kind| (*kind, self.len_of(*kind)))
            .collect()
    }

    pub fn total_records(&self) -> usize {
        self.counts().values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_keys_follow_input_file_convention() {
        assert_eq!(EntityKind::Food.config_key(), "food_input_file");
        assert_eq!(
            EntityKind::FoodNutrient.config_key(),
            "food_nutrient_input_file"
        );
        assert_eq!(EntityKind::BrandedFood.table(), "branded_foods");
    }

    #[test]
    fn test_load_order_covers_every_entity() {
        let mut by_size = EntityKind::BY_EXPECTED_SIZE.to_vec();
        let mut load = EntityKind::LOAD_ORDER.to_vec();
        by_size.sort();
        load.sort();
        assert_eq!(by_size, load);

        let food = EntityKind::LOAD_ORDER
            .iter()
            .position(|k| *k == EntityKind::Food)
            .unwrap();
        let nutrients = EntityKind::LOAD_ORDER
            .iter()
            .position(|k| *k == EntityKind::FoodNutrient)
            .unwrap();
        assert!(food < nutrients);
    }

    #[test]
    fn test_food_data_type_codes() {
        assert_eq!(
            FoodDataType::from_code("foundation_food"),
            Some(FoodDataType::Foundation)
        );
        assert_eq!(FoodDataType::from_code("sample_food"), None);
        assert_eq!(FoodDataType::Branded.code(), "branded_food");
    }

    #[test]
    fn test_counts_reports_every_entity() {
        let datasets = FdcDatasets {
            measure_units: vec![MeasureUnit {
                id: 1000,
                name: "cup".to_string(),
            }],
            ..Default::default()
        };

        let counts = datasets.counts();
        assert_eq!(counts.len(), 7);
        assert_eq!(counts[&EntityKind::MeasureUnit], 1);
        assert_eq!(counts[&EntityKind::Food], 0);
        assert_eq!(datasets.total_records(), 1);
    }
}
