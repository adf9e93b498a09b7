//! Case site reader over plain HTTP.
//!
//! Each page is fetched once with a bounded timeout and queried with the same CSS
//! selectors a browser session would wait on. A selector that matches nothing is
//! reported as a timeout, the same way an element that never renders would be.

use crate::core::{ConfigProvider, Item, PageExtractor, PageOutcome, ScrapedCase};
use crate::utils::error::{CaseOddsError, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use url::Url;

const NOT_FOUND: &str = "div.wrap-404";
const CASE_TITLE: &str = "div.case-title > h1";
const CASE_PRICE: &str = r#"span[data-qa="sticker_case_price_element"].price"#;
const ODDS_ROWS: &str = "div.simplebar-content-wrapper div.row";
const ITEM_WEAPON: &str = "p.name span.weapon-name";
const ITEM_FINISH: &str = "p.name span.weapon-finish";
const ITEM_PRICE: &str = "div.price-cell";
const ITEM_ODDS: &str = "div.odds-cell";
const CASE_LINKS: &str = "a.case-entity";

/// Compiled page selectors.
struct Selectors {
    not_found: Selector,
    case_title: Selector,
    case_price: Selector,
    odds_rows: Selector,
    item_weapon: Selector,
    item_finish: Selector,
    item_price: Selector,
    item_odds: Selector,
    case_links: Selector,
}

impl Selectors {
    fn compile() -> Result<Self> {
        Ok(Self {
            not_found: selector(NOT_FOUND)?,
            case_title: selector(CASE_TITLE)?,
            case_price: selector(CASE_PRICE)?,
            odds_rows: selector(ODDS_ROWS)?,
            item_weapon: selector(ITEM_WEAPON)?,
            item_finish: selector(ITEM_FINISH)?,
            item_price: selector(ITEM_PRICE)?,
            item_odds: selector(ITEM_ODDS)?,
            case_links: selector(CASE_LINKS)?,
        })
    }
}

pub struct HtmlPageExtractor {
    client: Client,
    home_url: String,
    timeout: Duration,
    settle: Duration,
    number: Regex,
    selectors: Selectors,
}

impl HtmlPageExtractor {
    pub fn new(home_url: String, timeout: Duration, settle: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("case-odds/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let number = Regex::new(r"\d+(?:\.\d+)?").map_err(|e| CaseOddsError::ConfigError {
            message: format!("number pattern: {}", e),
        })?;
        let selectors = Selectors::compile()?;

        Ok(Self {
            client,
            home_url,
            timeout,
            settle,
            number,
            selectors,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C, settle: Duration) -> Result<Self> {
        Self::new(
            config.home_url().to_string(),
            Duration::from_secs(config.page_timeout_secs()),
            settle,
        )
    }

    async fn fetch(&self, url: &str) -> Result<(StatusCode, String)> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_http(url, e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_http(url, e))?;
        tracing::debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok((status, body))
    }

    fn map_http(&self, url: &str, e: reqwest::Error) -> CaseOddsError {
        if e.is_timeout() {
            CaseOddsError::TimeoutError {
                what: url.to_string(),
                waited: self.timeout,
            }
        } else {
            CaseOddsError::HttpError(e)
        }
    }

    fn parse_case_page(&self, url: &str, html: &str) -> Result<PageOutcome> {
        let doc = Html::parse_document(html);
        let sel = &self.selectors;

        if doc.select(&sel.not_found).next().is_some() {
            return Ok(PageOutcome::NotFound);
        }

        let title = self.wait_for(doc.select(&sel.case_title), "case title")?;
        let name = clean_text(&element_text(title));
        let price_tag = self.wait_for(doc.select(&sel.case_price), "case price")?;
        let price = self.parse_number(url, &element_text(price_tag))?;
        tracing::debug!("{} costs {}", name, price);

        let mut items = Vec::new();
        for row in doc.select(&sel.odds_rows) {
            if row.value().classes().any(|c| c == "head") {
                continue;
            }

            let weapon = self.wait_for(row.select(&sel.item_weapon), "item name")?;
            let finish = self.wait_for(row.select(&sel.item_finish), "item finish")?;
            let item_name = format!(
                "{} | {}",
                clean_text(&element_text(weapon)),
                clean_text(&element_text(finish))
            );
            let price_cell = self.wait_for(row.select(&sel.item_price), "item price")?;
            let odds_cell = self.wait_for(row.select(&sel.item_odds), "item odds")?;
            let item_price = self.parse_number(url, &element_text(price_cell))?;
            let odds_percent = self.parse_number(url, &element_text(odds_cell))?;

            tracing::trace!("{}: ${} at {}%", item_name, item_price, odds_percent);
            items.push(Item::new(item_price, odds_percent / 100.0));
        }

        if items.is_empty() {
            return Err(self.timed_out("odds table"));
        }

        Ok(PageOutcome::Found(ScrapedCase { name, price, items }))
    }

    fn parse_case_links(&self, html: &str) -> Result<Vec<String>> {
        let doc = Html::parse_document(html);
        let base = Url::parse(&self.home_url).map_err(|e| CaseOddsError::ConfigError {
            message: format!("home_url is not a URL: {}", e),
        })?;

        let mut urls: Vec<String> = Vec::new();
        for link in doc.select(&self.selectors.case_links) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            match base.join(href) {
                Ok(url) => {
                    let url = url.to_string();
                    if !urls.contains(&url) {
                        urls.push(url);
                    }
                }
                Err(e) => tracing::debug!("Skipping case link {}: {}", href, e),
            }
        }
        Ok(urls)
    }

    /// First match, or a timeout naming the element that never showed up.
    fn wait_for<'a>(
        &self,
        mut matches: impl Iterator<Item = ElementRef<'a>>,
        what: &str,
    ) -> Result<ElementRef<'a>> {
        matches.next().ok_or_else(|| self.timed_out(what))
    }

    fn timed_out(&self, what: &str) -> CaseOddsError {
        CaseOddsError::TimeoutError {
            what: what.to_string(),
            waited: self.timeout,
        }
    }

    fn parse_number(&self, url: &str, text: &str) -> Result<f64> {
        let cleaned = clean_text(text).replace(',', "");
        self.number
            .find(&cleaned)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .ok_or_else(|| CaseOddsError::ExtractionError {
                url: url.to_string(),
                message: format!("expected a number, found {:?}", text.trim()),
            })
    }
}

#[async_trait]
impl PageExtractor for HtmlPageExtractor {
    async fn discover_case_urls(&self) -> Result<Vec<String>> {
        let (status, body) = self.fetch(&self.home_url).await?;
        if !status.is_success() {
            tracing::warn!("Home page returned {}", status);
            return Ok(Vec::new());
        }
        self.parse_case_links(&body)
    }

    async fn extract_case(&self, url: &str) -> Result<PageOutcome> {
        let (status, body) = self.fetch(url).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(PageOutcome::NotFound);
        }
        if !status.is_success() {
            return Err(CaseOddsError::ExtractionError {
                url: url.to_string(),
                message: format!("unexpected status {}", status),
            });
        }

        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }

        self.parse_case_page(url, &body)
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| CaseOddsError::ConfigError {
        message: format!("invalid selector {}: {}", css, e),
    })
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

/// Text before the first `-`, without currency or percent signs.
pub fn clean_text(text: &str) -> String {
    text.split('-')
        .next()
        .unwrap_or_default()
        .replace(['$', '%'], "")
        .trim()
        .to_string()
}
