use crate::config::CrawlerConfig;
use crate::core::economics::{compute_case, probability_mass};
use crate::core::report::{render_case_transcript, render_summary};
use crate::core::{Case, Metric, PageExtractor, PageOutcome, Stats, StatsMap, StatsStore, Storage};
use crate::utils::error::{CaseOddsError, Result};
use std::collections::HashSet;
use url::Url;

pub const SUMMARY_FILE: &str = "max-min-stats.txt";

/// Free level cases the site never lists on its home page.
pub fn free_case_identifiers() -> Vec<String> {
    std::iter::once(3)
        .chain((10..=120).step_by(10))
        .map(|level| format!("lvl-{}", level))
        .collect()
}

/// Last non-empty path segment of a case URL.
pub fn case_identifier(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(String::from))
        })
        .unwrap_or_else(|| url.trim_end_matches('/').rsplit('/').next().unwrap_or(url).to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlMode {
    /// Scrape every discovered case.
    Refresh,
    /// Start from the snapshot and scrape only cases it does not cover.
    Resume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseOutcome {
    Scraped,
    Skipped,
    NotFound,
    TimedOut,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub discovery_attempts: u32,
    pub discovered: usize,
    pub scraped: usize,
    pub skipped: usize,
    pub not_found: usize,
    pub timed_out: usize,
    pub failed: usize,
}

impl CrawlSummary {
    pub fn record(&mut self, outcome: CaseOutcome) {
        match outcome {
            CaseOutcome::Scraped => self.scraped += 1,
            CaseOutcome::Skipped => self.skipped += 1,
            CaseOutcome::NotFound => self.not_found += 1,
            CaseOutcome::TimedOut => self.timed_out += 1,
            CaseOutcome::Failed => self.failed += 1,
        }
    }
}

/// Everything a crawl mutates, owned by the orchestrator for one run.
#[derive(Debug, Default)]
pub struct CrawlState {
    pub stats: StatsMap,
    /// The case being scraped; cleared once its stats are merged.
    pub current: Option<Case>,
    pub summary: CrawlSummary,
    persisted_urls: HashSet<String>,
}

impl CrawlState {
    pub fn resumed_from(stats: StatsMap) -> Self {
        let persisted_urls = stats.values().map(|s| s.source_url.clone()).collect();
        Self {
            stats,
            persisted_urls,
            ..Self::default()
        }
    }

    pub fn is_persisted(&self, url: &str) -> bool {
        self.persisted_urls.contains(url)
    }
}

#[derive(Debug)]
pub struct CrawlReport {
    pub summary: CrawlSummary,
    pub stats: StatsMap,
    /// Files written by the stats store.
    pub written: Vec<String>,
}

pub struct CrawlOrchestrator<E: PageExtractor, T: StatsStore, S: Storage> {
    extractor: E,
    store: T,
    output: S,
    config: CrawlerConfig,
}

impl<E: PageExtractor, T: StatsStore, S: Storage> CrawlOrchestrator<E, T, S> {
    pub fn new(extractor: E, store: T, output: S, config: CrawlerConfig) -> Self {
        Self {
            extractor,
            store,
            output,
            config,
        }
    }

    pub fn mode(&self) -> CrawlMode {
        if self.config.crawl.refresh {
            CrawlMode::Refresh
        } else {
            CrawlMode::Resume
        }
    }

    pub async fn run(&self) -> Result<CrawlReport> {
        let mode = self.mode();
        tracing::info!("🚀 Starting {:?} crawl", mode);

        let mut state = match mode {
            CrawlMode::Refresh => CrawlState::default(),
            CrawlMode::Resume => CrawlState::resumed_from(self.store.load().await?),
        };

        let urls = self.discover(mode, &mut state.summary).await?;
        tracing::info!("🔍 Discovered {} case URLs", urls.len());

        for url in &urls {
            let outcome = self.scrape_case(&mut state, url).await;
            state.summary.record(outcome);
        }

        tracing::info!(
            "✅ Crawl finished: {} scraped, {} skipped, {} not found, {} timed out, {} failed",
            state.summary.scraped,
            state.summary.skipped,
            state.summary.not_found,
            state.summary.timed_out,
            state.summary.failed
        );

        self.report(&state.stats).await?;
        let written = self.export(&state.stats).await?;

        Ok(CrawlReport {
            summary: state.summary,
            stats: state.stats,
            written,
        })
    }

    /// Rewrites every ranked CSV from the snapshot without touching the site.
    pub async fn export_only(&self) -> Result<Vec<String>> {
        let stats = self.store.load().await?;
        self.export(&stats).await
    }

    /// Case URLs to visit. Empty results are retried per the discovery policy.
    pub async fn discover(&self, mode: CrawlMode, summary: &mut CrawlSummary) -> Result<Vec<String>> {
        let policy = self.config.discovery_policy(mode == CrawlMode::Resume);
        let mut attempts = 0;

        let mut urls = loop {
            attempts += 1;
            let urls = if self.config.site.cases.is_empty() {
                match self.extractor.discover_case_urls().await {
                    Ok(urls) => urls,
                    Err(e) => {
                        tracing::warn!("Case discovery failed: {}", e);
                        Vec::new()
                    }
                }
            } else {
                self.config
                    .site
                    .cases
                    .iter()
                    .map(|c| self.config.case_url(c))
                    .collect()
            };

            if !urls.is_empty() {
                break urls;
            }

            match policy.next_delay(attempts) {
                Some(delay) => {
                    tracing::info!("retrying getting case urls in {:?}", delay);
                    tokio::time::sleep(delay).await;
                }
                None => return Err(CaseOddsError::DiscoveryExhausted { attempts }),
            }
        };

        if self.config.crawl.include_free {
            urls.extend(
                free_case_identifiers()
                    .iter()
                    .map(|c| self.config.case_url(c)),
            );
        }

        summary.discovery_attempts = attempts;
        summary.discovered = urls.len();
        Ok(urls)
    }

    /// Scrapes one case into `state`. Failures only ever abandon this case.
    pub async fn scrape_case(&self, state: &mut CrawlState, url: &str) -> CaseOutcome {
        if self.mode() == CrawlMode::Resume && state.is_persisted(url) {
            tracing::debug!("Skipping {}, already in snapshot", url);
            return CaseOutcome::Skipped;
        }

        let identifier = case_identifier(url);
        let scraped = match self.extractor.extract_case(url).await {
            Ok(PageOutcome::Found(scraped)) => scraped,
            Ok(PageOutcome::NotFound) => {
                tracing::warn!("🔴 {} NOT FOUND", identifier);
                return CaseOutcome::NotFound;
            }
            Err(e @ CaseOddsError::TimeoutError { .. }) => {
                tracing::warn!("⏱️ Abandoning {}: {}", identifier, e);
                return CaseOutcome::TimedOut;
            }
            Err(e) => {
                if e.is_case_local() {
                    tracing::warn!("Abandoning {}: {}", identifier, e);
                } else {
                    tracing::error!("❌ Abandoning {}: {}", identifier, e);
                }
                return CaseOutcome::Failed;
            }
        };

        let mass = probability_mass(&scraped.items);
        if mass > 1.0 + 1e-6 {
            tracing::warn!(
                "{} drop chances add up to {:.2}%, stats will be skewed",
                identifier,
                mass * 100.0
            );
        }

        let case = state.current.insert(Case {
            identifier,
            source_url: url.to_string(),
            price: scraped.price,
            items: scraped.items,
        });
        let stats = compute_case(case);
        let identifier = case.identifier.clone();

        self.emit_transcript(&identifier, &scraped.name, &stats).await;
        state.stats.insert(scraped.name, stats);
        state.current = None;

        CaseOutcome::Scraped
    }

    pub async fn report(&self, stats: &StatsMap) -> Result<()> {
        let summary = render_summary(stats, self.config.output.report_size, chrono::Utc::now())?;
        if self.config.output.to_file {
            self.output
                .write_file(SUMMARY_FILE, summary.as_bytes())
                .await?;
            tracing::info!("📝 Wrote {}", SUMMARY_FILE);
        } else {
            println!("{}", summary);
        }
        Ok(())
    }

    /// Saves the snapshot, then one CSV per ranking metric.
    pub async fn export(&self, stats: &StatsMap) -> Result<Vec<String>> {
        let mut written = vec![self.store.save(stats, None).await?];
        for metric in Metric::ALL {
            let path = self.store.save(stats, Some(metric)).await?;
            tracing::info!("----- Wrote to {} -----", path);
            written.push(path);
        }
        Ok(written)
    }

    async fn emit_transcript(&self, identifier: &str, name: &str, stats: &Stats) {
        let transcript = render_case_transcript(name, stats);
        if !self.config.output.to_file {
            println!("{}", transcript);
            return;
        }

        let path = format!("cases/{}.txt", identifier);
        match self.output.write_file(&path, transcript.as_bytes()).await {
            Ok(()) => tracing::info!("--- Scraped {} ---", identifier),
            Err(e) => tracing::warn!("Could not write {}: {}", path, e),
        }
    }
}
