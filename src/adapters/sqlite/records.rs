use crate::domain::model::{
    BrandedFood, EntityKind, Food, FoodCategory, FoodDataType, FoodNutrient, FoodPortion,
    MeasureUnit, Nutrient,
};
use crate::domain::ports::TableRecord;
use rusqlite::types::ToSqlOutput;
use rusqlite::{params, ToSql};

impl ToSql for FoodDataType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl TableRecord for Food {
    const ENTITY: EntityKind = EntityKind::Food;
    const COLUMNS: &'static [&'static str] = &[
        "fdc_id",
        "data_type",
        "description",
        "food_category_id",
        "publication_date",
    ];
    const CREATE_TABLE: &'static str = r#"
        CREATE TABLE foods (
            fdc_id INTEGER PRIMARY KEY,
            data_type TEXT NOT NULL,
            description TEXT NOT NULL,
            food_category_id TEXT,
            publication_date TEXT NOT NULL
        )
    "#;

    fn sql_params(&self) -> Vec<&dyn ToSql> {
        params![
            self.fdc_id,
            self.data_type,
            self.description,
            self.food_category_id,
            self.publication_date,
        ]
        .to_vec()
    }
}

impl TableRecord for BrandedFood {
    const ENTITY: EntityKind = EntityKind::BrandedFood;
    const COLUMNS: &'static [&'static str] = &[
        "fdc_id",
        "brand_owner",
        "brand_name",
        "subbrand_name",
        "gtin_upc",
        "ingredients",
        "not_a_significant_source_of",
        "serving_size",
        "serving_size_unit",
        "household_serving_fulltext",
        "branded_food_category",
        "data_source",
        "package_weight",
        "modified_date",
        "available_date",
        "market_country",
        "discontinued_date",
        "preparation_state_code",
        "trade_channel",
        "short_description",
        "material_code",
    ];
    const CREATE_TABLE: &'static str = r#"
        CREATE TABLE branded_foods (
            fdc_id INTEGER PRIMARY KEY,
            brand_owner TEXT,
            brand_name TEXT,
            subbrand_name TEXT,
            gtin_upc TEXT,
            ingredients TEXT,
            not_a_significant_source_of TEXT,
            serving_size REAL,
            serving_size_unit TEXT,
            household_serving_fulltext TEXT,
            branded_food_category TEXT,
            data_source TEXT,
            package_weight TEXT,
            modified_date TEXT,
            available_date TEXT,
            market_country TEXT,
            discontinued_date TEXT,
            preparation_state_code TEXT,
            trade_channel TEXT,
            short_description TEXT,
            material_code TEXT
        )
    "#;

    fn sql_params(&self) -> Vec<&dyn ToSql> {
        params![
            self.fdc_id,
            self.brand_owner,
            self.brand_name,
            self.subbrand_name,
            self.gtin_upc,
            self.ingredients,
            self.not_a_significant_source_of,
            self.serving_size,
            self.serving_size_unit,
            self.household_serving_fulltext,
            self.branded_food_category,
            self.data_source,
            self.package_weight,
            self.modified_date,
            self.available_date,
            self.market_country,
            self.discontinued_date,
            self.preparation_state_code,
            self.trade_channel,
            self.short_description,
            self.material_code,
        ]
        .to_vec()
    }
}

impl TableRecord for FoodCategory {
    const ENTITY: EntityKind = EntityKind::FoodCategory;
    const COLUMNS: &'static [&'static str] = &["id", "code", "description"];
    const CREATE_TABLE: &'static str = r#"
        CREATE TABLE food_categories (
            id INTEGER PRIMARY KEY,
            code INTEGER NOT NULL,
            description TEXT NOT NULL
        )
    "#;

    fn sql_params(&self) -> Vec<&dyn ToSql> {
        params![self.id, self.code, self.description].to_vec()
    }
}

impl TableRecord for MeasureUnit {
    const ENTITY: EntityKind = EntityKind::MeasureUnit;
    const COLUMNS: &'static [&'static str] = &["id", "name"];
    const CREATE_TABLE: &'static str = r#"
        CREATE TABLE measure_units (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        )
    "#;

    fn sql_params(&self) -> Vec<&dyn ToSql> {
        params![self.id, self.name].to_vec()
    }
}

impl TableRecord for Nutrient {
    const ENTITY: EntityKind = EntityKind::Nutrient;
    const COLUMNS: &'static [&'static str] = &["id", "name", "unit_name", "nutrient_nbr", "rank"];
    const CREATE_TABLE: &'static str = r#"
        CREATE TABLE nutrients (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            unit_name TEXT NOT NULL,
            nutrient_nbr TEXT,
            rank REAL
        )
    "#;

    fn sql_params(&self) -> Vec<&dyn ToSql> {
        params![
            self.id,
            self.name,
            self.unit_name,
            self.nutrient_nbr,
            self.rank,
        ]
        .to_vec()
    }
}

impl TableRecord for FoodNutrient {
    const ENTITY: EntityKind = EntityKind::FoodNutrient;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "fdc_id",
        "nutrient_id",
        "amount",
        "data_points",
        "derivation_id",
        "min",
        "max",
        "median",
        "loq",
        "footnote",
        "min_year_acquired",
        "percent_daily_value",
    ];
    const CREATE_TABLE: &'static str = r#"
        CREATE TABLE food_nutrients (
            id INTEGER PRIMARY KEY,
            fdc_id INTEGER NOT NULL,
            nutrient_id INTEGER NOT NULL,
            amount REAL,
            data_points INTEGER,
            derivation_id TEXT,
            min REAL,
            max REAL,
            median REAL,
            loq REAL,
            footnote TEXT,
            min_year_acquired INTEGER,
            percent_daily_value REAL
        )
    "#;

    fn sql_params(&self) -> Vec<&dyn ToSql> {
        params![
            self.id,
            self.fdc_id,
            self.nutrient_id,
            self.amount,
            self.data_points,
            self.derivation_id,
            self.min,
            self.max,
            self.median,
            self.loq,
            self.footnote,
            self.min_year_acquired,
            self.percent_daily_value,
        ]
        .to_vec()
    }
}

impl TableRecord for FoodPortion {
    const ENTITY: EntityKind = EntityKind::FoodPortion;
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "fdc_id",
        "seq_num",
        "amount",
        "measure_unit_id",
        "portion_description",
        "modifier",
        "gram_weight",
        "data_points",
        "footnote",
        "min_year_acquired",
    ];
    const CREATE_TABLE: &'static str = r#"
        CREATE TABLE food_portions (
            id INTEGER PRIMARY KEY,
            fdc_id INTEGER NOT NULL,
            seq_num INTEGER,
            amount REAL,
            measure_unit_id INTEGER,
            portion_description TEXT,
            modifier TEXT,
            gram_weight REAL,
            data_points INTEGER,
            footnote TEXT,
            min_year_acquired INTEGER
        )
    "#;

    fn sql_params(&self) -> Vec<&dyn ToSql> {
        params![
            self.id,
            self.fdc_id,
            self.seq_num,
            self.amount,
            self.measure_unit_id,
            self.portion_description,
            self.modifier,
            self.gram_weight,
            self.data_points,
            self.footnote,
            self.min_year_acquired,
        ]
        .to_vec()
    }
}
