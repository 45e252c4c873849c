pub mod core;
pub mod pipeline;
pub mod scraping;

// --- Primary core exports ---
pub use crate::core::config;
pub use crate::core::error::ScrapeError;
pub use crate::core::types;
pub use crate::core::types::*;
pub use crate::core::urls;
pub use crate::core::AppState;

// --- Scraping exports ---
pub use crate::scraping::extractor;
pub use crate::scraping::{ClickTarget, DynamicRenderer};
