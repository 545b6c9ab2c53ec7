// Adapters layer: concrete implementations of the domain ports (http, storage, notification).

pub mod csv_store;
pub mod discord;
pub mod http;

pub use csv_store::CsvCodeStore;
pub use discord::DiscordNotifier;
pub use http::{build_client, HttpPageSource, RetryPolicy};
