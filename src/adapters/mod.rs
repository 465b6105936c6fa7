// Adapters layer: concrete implementations for external systems (CSV sources, SQLite store).

pub mod csv_extractor;
pub mod sqlite;

pub use csv_extractor::{CsvExtractor, ExtractStats, Extracted};
pub use sqlite::loader::{BatchLoader, LoadReport, DEFAULT_BATCH_SIZE};
pub use sqlite::schema::{SchemaManager, SchemaReport};
pub use sqlite::Store;
