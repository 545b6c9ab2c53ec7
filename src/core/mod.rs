pub mod engine;
pub mod pipeline;

pub use crate::domain::model::{
    ClassHint, CodeRecord, CodeSet, ExpirationMap, Harvest, NewCodes, PageScan, RunReport,
    ScanStrategy,
};
pub use crate::domain::ports::{CodeStore, ConfigProvider, Notifier, PageSource, Pipeline};
pub use crate::utils::error::Result;
