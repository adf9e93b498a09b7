use crate::domain::model::{Metric, PageOutcome, StatsMap};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn home_url(&self) -> &str;
    fn output_path(&self) -> &str;
    fn page_timeout_secs(&self) -> u64;
}

/// Reads case listings and case pages from the site.
#[async_trait]
pub trait PageExtractor: Send + Sync {
    /// Every case URL the site currently lists. May be empty when the site is slow.
    async fn discover_case_urls(&self) -> Result<Vec<String>>;

    async fn extract_case(&self, url: &str) -> Result<PageOutcome>;
}

/// Persists stats as tabular rows keyed by case name.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// A missing file yields an empty map rather than an error.
    async fn load(&self) -> Result<StatsMap>;

    /// Writes the map ordered by `ranking` descending, or in key order when `None`,
    /// and returns the path written.
    async fn save(&self, stats: &StatsMap, ranking: Option<Metric>) -> Result<String>;
}
