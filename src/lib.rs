pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::CrawlerConfig;

pub use crate::adapters::{CsvStatsStore, HtmlPageExtractor, LocalStorage};
pub use crate::core::crawl::{CrawlOrchestrator, CrawlReport, CrawlSummary};
pub use crate::utils::error::{CaseOddsError, Result};
