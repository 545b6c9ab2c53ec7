use crate::core::{Pipeline, RunReport};
use crate::utils::error::Result;

/// Runs one scrape: extract, transform, load.
pub struct ScrapeEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ScrapeEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::debug!("Extracting codes from page");
        let harvest = self.pipeline.extract().await?;
        tracing::debug!(
            "Extracted {} code(s), {} already stored",
            harvest.scan.found.len(),
            harvest.known.len()
        );

        let batch = self.pipeline.transform(harvest).await?;
        tracing::debug!("Transformed into {} new code(s)", batch.codes.len());

        let report = self.pipeline.load(batch).await?;
        if report.new_codes.is_empty() {
            tracing::info!("No new codes found");
        } else if report.dry_run {
            tracing::info!("Dry run: {} code(s) would be added", report.new_codes.len());
        } else {
            tracing::info!("Done: {} new code(s) saved", report.written);
        }

        Ok(report)
    }
}
