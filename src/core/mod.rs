pub mod etl;
pub mod extract;
pub mod pipeline;
pub mod transform;

pub use crate::domain::model::FdcDatasets;
pub use crate::domain::ports::{ConfigProvider, Pipeline, Transform};
pub use crate::utils::error::Result;
