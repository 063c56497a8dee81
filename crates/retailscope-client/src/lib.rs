pub mod client;
pub mod error;
pub mod types;

pub use client::ScrapeClient;
pub use error::ClientError;
pub use types::{Envelope, Scraped};
