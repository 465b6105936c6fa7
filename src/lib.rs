pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::EtlConfig;

pub use core::etl::{EtlEngine, PhaseTimings, RunReport};
pub use core::pipeline::{FdcPipeline, LoadSummary, PipelineSettings};
pub use domain::model::{EntityKind, FdcDatasets};
pub use utils::error::{EtlError, Result};
