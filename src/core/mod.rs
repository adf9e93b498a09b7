pub mod crawl;
pub mod economics;
pub mod ranking;
pub mod report;
pub mod retry;

pub use crate::domain::model::{
    Case, Direction, Item, Metric, PageOutcome, RankedEntry, ScrapedCase, Stats, StatsMap,
};
pub use crate::domain::ports::{ConfigProvider, PageExtractor, StatsStore, Storage};
pub use crate::utils::error::Result;
