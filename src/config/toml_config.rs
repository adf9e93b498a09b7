use crate::core::retry::RetryPolicy;
use crate::core::ConfigProvider;
use crate::utils::error::{CaseOddsError, Result};
use crate::utils::validation::{
    validate_case_identifiers, validate_path, validate_positive_number, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://skin.club/en/cases/open/";
pub const DEFAULT_HOME_URL: &str = "https://skin.club/en/";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    pub site: SiteConfig,
    pub crawl: CrawlSettings,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Case identifiers are appended to this to form case URLs.
    pub base_url: String,
    pub home_url: String,
    /// Scrape only these cases instead of crawling the home page.
    pub cases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlSettings {
    pub refresh: bool,
    pub include_free: bool,
    pub page_timeout_secs: u64,
    pub settle_millis: u64,
    pub discovery_backoff_secs: u64,
    pub resume_discovery_backoff_secs: u64,
    pub max_discovery_attempts: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_path: String,
    pub to_file: bool,
    pub report_size: usize,
    pub snapshot_file: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            home_url: DEFAULT_HOME_URL.to_string(),
            cases: Vec::new(),
        }
    }
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            refresh: false,
            include_free: false,
            page_timeout_secs: 5,
            settle_millis: 2000,
            discovery_backoff_secs: 15,
            resume_discovery_backoff_secs: 30,
            max_discovery_attempts: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_path: "./output".to_string(),
            to_file: false,
            report_size: 10,
            snapshot_file: "stats_.csv".to_string(),
        }
    }
}

impl CrawlerConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CaseOddsError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CaseOddsError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CASE_ODDS_OUTPUT})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| CaseOddsError::ConfigError {
            message: format!("env var pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn case_url(&self, identifier: &str) -> String {
        format!("{}{}", self.base_url(), identifier)
    }

    /// Backoff between empty discovery attempts; resumed crawls wait longer.
    pub fn discovery_policy(&self, resumed: bool) -> RetryPolicy {
        let secs = if resumed {
            self.crawl.resume_discovery_backoff_secs
        } else {
            self.crawl.discovery_backoff_secs
        };
        RetryPolicy::unbounded(Duration::from_secs(secs))
            .with_max_attempts(self.crawl.max_discovery_attempts)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.crawl.settle_millis)
    }
}

impl ConfigProvider for CrawlerConfig {
    fn base_url(&self) -> &str {
        &self.site.base_url
    }

    fn home_url(&self) -> &str {
        &self.site.home_url
    }

    fn output_path(&self) -> &str {
        &self.output.output_path
    }

    fn page_timeout_secs(&self) -> u64 {
        self.crawl.page_timeout_secs
    }
}

impl Validate for CrawlerConfig {
    fn validate(&self) -> Result<()> {
        validate_url("site.base_url", &self.site.base_url)?;
        validate_url("site.home_url", &self.site.home_url)?;
        validate_case_identifiers("site.cases", &self.site.cases)?;
        validate_path("output.output_path", &self.output.output_path)?;
        validate_path("output.snapshot_file", &self.output.snapshot_file)?;
        validate_positive_number("output.report_size", self.output.report_size as u64, 1)?;
        validate_positive_number("crawl.page_timeout_secs", self.crawl.page_timeout_secs, 1)?;

        if let Some(max) = self.crawl.max_discovery_attempts {
            validate_positive_number("crawl.max_discovery_attempts", max as u64, 1)?;
        }

        if !self.site.base_url.ends_with('/') {
            return Err(CaseOddsError::InvalidConfigValueError {
                field: "site.base_url".to_string(),
                value: self.site.base_url.clone(),
                reason: "Base URL must end with '/' so case identifiers can be appended"
                    .to_string(),
            });
        }

        Ok(())
    }
}
