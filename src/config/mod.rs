pub mod toml_config;

pub use toml_config::CrawlerConfig;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "case-odds")]
#[command(about = "Scrape loot cases and rank them by expected value")]
pub struct CliConfig {
    /// TOML file with crawl settings; flags below override it
    #[arg(short, long)]
    pub config: Option<String>,

    /// Scrape only these case identifiers instead of crawling the home page
    #[arg(long, value_delimiter = ',')]
    pub cases: Vec<String>,

    /// Re-scrape every case instead of resuming from the stats snapshot
    #[arg(long)]
    pub refresh: bool,

    /// Also scrape the free level cases
    #[arg(long)]
    pub include_free: bool,

    /// Write transcripts and the summary to files instead of stdout
    #[arg(long)]
    pub to_file: bool,

    /// Skip crawling and only rewrite the ranked CSVs from the snapshot
    #[arg(long)]
    pub export_only: bool,

    #[arg(long)]
    pub output_path: Option<String>,

    #[arg(long)]
    pub report_size: Option<usize>,

    #[arg(long)]
    pub page_timeout_secs: Option<u64>,

    #[arg(long)]
    pub max_discovery_attempts: Option<u32>,

    #[arg(long)]
    pub base_url: Option<String>,

    #[arg(long)]
    pub home_url: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the TOML file if one was given and applies the flags on top of it.
    pub fn resolve(&self) -> crate::utils::error::Result<CrawlerConfig> {
        let mut config = match &self.config {
            Some(path) => CrawlerConfig::from_file(path)?,
            None => CrawlerConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut CrawlerConfig) {
        if !self.cases.is_empty() {
            config.site.cases = self.cases.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.site.base_url = base_url.clone();
        }
        if let Some(home_url) = &self.home_url {
            config.site.home_url = home_url.clone();
        }
        if self.refresh {
            config.crawl.refresh = true;
        }
        if self.include_free {
            config.crawl.include_free = true;
        }
        if let Some(secs) = self.page_timeout_secs {
            config.crawl.page_timeout_secs = secs;
        }
        if self.max_discovery_attempts.is_some() {
            config.crawl.max_discovery_attempts = self.max_discovery_attempts;
        }
        if self.to_file {
            config.output.to_file = true;
        }
        if let Some(output_path) = &self.output_path {
            config.output.output_path = output_path.clone();
        }
        if let Some(report_size) = self.report_size {
            config.output.report_size = report_size;
        }
    }
}
