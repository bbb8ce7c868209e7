use crate::core::Pipeline;
use crate::domain::model::{RunSummary, YearOutcome, YearStatus};
use crate::utils::monitor::SystemMonitor;
use futures::stream::{self, StreamExt};

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    concurrency: usize,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P, concurrency: usize) -> Self {
        Self::new_with_monitoring(pipeline, concurrency, false)
    }

    pub fn new_with_monitoring(pipeline: P, concurrency: usize, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            concurrency: concurrency.max(1),
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Runs extract → transform → load for every year, several years at a time.
    ///
    /// A failing year is recorded in the summary and does not stop the others.
    pub async fn run(&self, years: &[u16]) -> RunSummary {
        tracing::info!(
            "🚀 Processing {} year(s) with up to {} in flight",
            years.len(),
            self.concurrency
        );

        let mut outcomes: Vec<YearOutcome> = stream::iter(years.iter().copied())
            .map(|year| async move {
                let status = match self.run_year(year).await {
                    Ok(files) if files.is_empty() => YearStatus::NoSnapshots,
                    Ok(files) => YearStatus::Written { files },
                    Err(e) => {
                        tracing::error!(
                            "❌ Year {} failed: {} (Category: {:?}, Severity: {:?})",
                            year,
                            e,
                            e.category(),
                            e.severity()
                        );
                        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                        YearStatus::Failed {
                            message: e.user_friendly_message(),
                        }
                    }
                };
                self.monitor.log_stats(&format!("year {}", year));
                YearOutcome { year, status }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        outcomes.sort_by_key(|o| o.year);
        self.monitor.log_final_stats();

        RunSummary { outcomes }
    }

    async fn run_year(&self, year: u16) -> crate::utils::error::Result<Vec<String>> {
        tracing::info!("📥 Extracting snapshots for {}", year);
        let snapshots = self.pipeline.extract(year).await?;
        tracing::debug!("Extracted {} snapshots for {}", snapshots.len(), year);

        let report = self.pipeline.transform(year, snapshots).await?;
        tracing::debug!(
            "Transformed {}: {} keyword result(s)",
            year,
            report.keyword_matches.len()
        );

        self.pipeline.load(report).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Snapshot, YearReport};
    use crate::utils::error::{ArchiveError, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StubPipeline {
        in_flight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl StubPipeline {
        fn new() -> Self {
            Self {
                in_flight: Arc::new(AtomicUsize::new(0)),
                peak: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait::async_trait]
    impl Pipeline for StubPipeline {
        async fn extract(&self, year: u16) -> Result<Vec<Snapshot>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match year {
                2001 => Err(ArchiveError::HttpStatus {
                    url: "http://test/cdx".to_string(),
                    status: 502,
                }),
                2002 => Ok(vec![]),
                _ => Ok(vec![Snapshot::new(format!("{}0101000000", year), "http://example.com/")]),
            }
        }

        async fn transform(&self, year: u16, snapshots: Vec<Snapshot>) -> Result<YearReport> {
            Ok(YearReport {
                year,
                snapshots,
                ..Default::default()
            })
        }

        async fn load(&self, report: YearReport) -> Result<Vec<String>> {
            Ok(report
                .snapshots
                .iter()
                .map(|s| format!("{}/{}.txt", report.year, s.timestamp))
                .collect())
        }
    }

    #[tokio::test]
    async fn test_failed_year_does_not_stop_others() {
        let engine = EtlEngine::new(StubPipeline::new(), 4);
        let summary = engine.run(&[2003, 2001, 2002]).await;

        let years: Vec<u16> = summary.outcomes.iter().map(|o| o.year).collect();
        assert_eq!(years, vec![2001, 2002, 2003]);
        assert_eq!(summary.failed_years(), vec![2001]);
        assert!(matches!(summary.outcomes[1].status, YearStatus::NoSnapshots));
        assert_eq!(summary.files_written(), 1);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let engine = EtlEngine::new(StubPipeline::new(), 2);
        engine.run(&[2003, 2004, 2005, 2006, 2007]).await;

        let peak = engine.pipeline().peak.load(Ordering::SeqCst);
        assert!(peak <= 2, "peak concurrency was {}", peak);
        assert!(peak >= 1);
    }
}
