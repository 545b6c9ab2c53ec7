use crate::domain::model::{
    ClassHint, CodeRecord, CodeSet, ExpirationMap, Harvest, NewCodes, RunReport,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Fetches raw page markup.
pub trait PageSource: Send + Sync {
    fn fetch(&self, url: &str) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Durable record of codes already seen.
pub trait CodeStore: Send + Sync {
    /// Create or upgrade the backing file so later reads and appends line up.
    fn prepare(&self) -> impl std::future::Future<Output = Result<()>> + Send;
    fn known_codes(&self) -> impl std::future::Future<Output = Result<CodeSet>> + Send;
    fn append(
        &self,
        records: &[CodeRecord],
    ) -> impl std::future::Future<Output = Result<usize>> + Send;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, codes: &[String], expirations: &ExpirationMap) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn page_url(&self) -> &str;
    fn class_hint(&self) -> Option<&ClassHint>;
    fn include_expired(&self) -> bool;
    fn dry_run(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Harvest>;
    async fn transform(&self, harvest: Harvest) -> Result<NewCodes>;
    async fn load(&self, batch: NewCodes) -> Result<RunReport>;
}
