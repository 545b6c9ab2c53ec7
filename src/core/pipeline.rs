use crate::core::{
    CodeRecord, CodeStore, ConfigProvider, Harvest, NewCodes, Notifier, PageSource, Pipeline,
    RunReport,
};
use crate::extract::scan_page;
use crate::utils::error::Result;
use chrono::{Local, NaiveDate};

pub struct ShiftPipeline<F: PageSource, S: CodeStore, C: ConfigProvider> {
    source: F,
    store: S,
    config: C,
    notifier: Option<Box<dyn Notifier>>,
    date_added: Option<NaiveDate>,
}

impl<F: PageSource, S: CodeStore, C: ConfigProvider> ShiftPipeline<F, S, C> {
    pub fn new(source: F, store: S, config: C) -> Self {
        Self {
            source,
            store,
            config,
            notifier: None,
            date_added: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Pins the "Date Added" column instead of using today's local date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date_added = Some(date);
        self
    }

    fn date_string(&self) -> String {
        self.date_added
            .unwrap_or_else(|| Local::now().date_naive())
            .format("%Y-%m-%d")
            .to_string()
    }
}

#[async_trait::async_trait]
impl<F: PageSource, S: CodeStore, C: ConfigProvider> Pipeline for ShiftPipeline<F, S, C> {
    async fn extract(&self) -> Result<Harvest> {
        self.store.prepare().await?;
        let known = self.store.known_codes().await?;
        tracing::info!("Existing codes: {}", known.len());

        tracing::debug!("Fetching page: {}", self.config.page_url());
        let html = self.source.fetch(self.config.page_url()).await?;

        let scan = scan_page(
            &html,
            self.config.class_hint(),
            self.config.include_expired(),
        );

        Ok(Harvest { known, scan })
    }

    async fn transform(&self, harvest: Harvest) -> Result<NewCodes> {
        let Harvest { known, scan } = harvest;
        let found = scan.found.len();

        let mut candidates = scan.found;
        let mut excluded_expired = 0;
        if !scan.expired.is_empty() {
            candidates.retain(|code| !scan.expired.contains(code));
            excluded_expired = found - candidates.len();
            tracing::info!("Excluded {} expired code(s) via page section", excluded_expired);
        } else if !self.config.include_expired() {
            tracing::debug!("No expired section or no expired codes found");
        }

        let codes: Vec<String> = candidates
            .into_iter()
            .filter(|code| !known.contains(code))
            .collect();
        tracing::info!("New codes to add: {}", codes.len());

        Ok(NewCodes {
            codes,
            expirations: scan.expirations,
            found,
            excluded_expired,
        })
    }

    async fn load(&self, batch: NewCodes) -> Result<RunReport> {
        let date = self.date_string();
        let records: Vec<CodeRecord> = batch
            .codes
            .iter()
            .map(|code| {
                let expiration = batch.expirations.get(code).map(String::as_str).unwrap_or("");
                CodeRecord::unredeemed(code, &date, expiration)
            })
            .collect();

        let mut report = RunReport {
            found: batch.found,
            excluded_expired: batch.excluded_expired,
            new_codes: batch.codes.clone(),
            dry_run: self.config.dry_run(),
            ..RunReport::default()
        };

        if self.config.dry_run() {
            for record in &records {
                tracing::info!(
                    "Would add code: {} (expires: {})",
                    record.code,
                    record.expiration
                );
            }
            return Ok(report);
        }

        report.written = self.store.append(&records).await?;
        for record in &records {
            if record.expiration.is_empty() {
                tracing::info!("Added code: {}", record.code);
            } else {
                tracing::info!("Added code: {} (expires: {})", record.code, record.expiration);
            }
        }

        if let Some(notifier) = &self.notifier {
            if !batch.codes.is_empty() {
                match notifier.notify(&batch.codes, &batch.expirations).await {
                    Ok(()) => {
                        report.notified = true;
                        tracing::info!("Posted {} new code(s) to webhook", batch.codes.len());
                    }
                    Err(e) => tracing::warn!("Webhook notification failed: {}", e),
                }
            }
        }

        Ok(report)
    }
}
