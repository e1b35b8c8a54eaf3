pub mod cache;
pub mod etl;
pub mod extractor;
pub mod scheduler;

pub use crate::domain::model::{FailurePolicy, ForecastRecord, Measurement, Snapshot};
pub use crate::domain::ports::{ConfigProvider, MarkupSource};
pub use crate::utils::error::Result;
