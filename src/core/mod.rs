pub mod etl;
pub mod pipeline;
pub mod render;
pub mod search;

pub use crate::domain::model::{Snapshot, YearReport};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
