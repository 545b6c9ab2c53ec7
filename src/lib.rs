pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod extract;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{Settings, TomlConfig};

pub use adapters::{build_client, CsvCodeStore, DiscordNotifier, HttpPageSource, RetryPolicy};
pub use core::{engine::ScrapeEngine, pipeline::ShiftPipeline};
pub use utils::error::{Result, ScrapeError};
