use crate::domain::model::{Snapshot, YearReport};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    /// Writes `data` to `path` (relative to the storage root), creating parent directories.
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Human-readable location of `path`, used when reporting saved files.
    fn display_path(&self, path: &str) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn cdx_endpoint(&self) -> &str;
    fn wayback_base(&self) -> &str;
    fn output_path(&self) -> &str;
    fn concurrent_requests(&self) -> usize;
    fn retry_attempts(&self) -> u32;
    fn retry_delay(&self) -> Duration;
    fn request_timeout(&self) -> Duration;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self, year: u16) -> Result<Vec<Snapshot>>;
    async fn transform(&self, year: u16, snapshots: Vec<Snapshot>) -> Result<YearReport>;
    async fn load(&self, report: YearReport) -> Result<Vec<String>>;
}
