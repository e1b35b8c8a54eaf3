pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use app::PollenService;
pub use crate::core::{
    cache::CacheStore, etl::RebuildEngine, extractor::ForecastExtractor,
    scheduler::RefreshScheduler,
};
pub use domain::model::{FailurePolicy, ForecastRecord, Measurement, Snapshot};
pub use utils::error::{PollenError, Result};
