pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use crate::adapters::{LocalStorage, WaybackClient};
pub use crate::core::{etl::EtlEngine, pipeline::ArchivePipeline};
pub use crate::domain::model::{OutputFormat, RunSummary, SearchRequest, Snapshot};
pub use crate::utils::error::{ArchiveError, Result};
