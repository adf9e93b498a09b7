use case_odds::core::{PageExtractor, PageOutcome, StatsStore};
use case_odds::{
    CaseOddsError, CrawlOrchestrator, CrawlerConfig, CsvStatsStore, HtmlPageExtractor,
    LocalStorage,
};
use httpmock::prelude::*;
use std::time::Duration;
use tempfile::TempDir;

fn case_page(title: &str, price: &str, items: &[(&str, &str)]) -> String {
    let rows: String = items
        .iter()
        .map(|(price, odds)| {
            format!(
                r#"<div class="row">
                     <p class="name"><span class="weapon-name">AWP</span><span class="weapon-finish">Safari Mesh</span></p>
                     <div class="price-cell">${}</div><div class="odds-cell">{}%</div>
                   </div>"#,
                price, odds
            )
        })
        .collect();

    format!(
        r#"<html><body>
             <div class="case-title"><h1>{}</h1></div>
             <span data-qa="sticker_case_price_element" class="price">${}</span>
             <div class="simplebar-content-wrapper">
               <div class="row head"><div class="price-cell">Price</div></div>
               {}
             </div>
           </body></html>"#,
        title, price, rows
    )
}

const HOME_PAGE: &str = r#"<html><body><div id="app-vue3">
  <div class="feast-banner-inner"></div>
  <a class="case-entity" href="/en/cases/open/knife">Knife</a>
  <a class="case-entity" href="/en/cases/open/diamond">Diamond</a>
  <a class="case-entity" href="/en/cases/open/retired">Retired</a>
</div></body></html>"#;

fn site_config(server: &MockServer, output_path: &str) -> CrawlerConfig {
    let mut config = CrawlerConfig::default();
    config.site.home_url = server.url("/en/");
    config.site.base_url = server.url("/en/cases/open/");
    config.crawl.refresh = true;
    config.crawl.settle_millis = 0;
    config.crawl.discovery_backoff_secs = 0;
    config.crawl.resume_discovery_backoff_secs = 0;
    config.output.output_path = output_path.to_string();
    config.output.to_file = true;
    config.output.report_size = 2;
    config
}

#[tokio::test]
async fn test_end_to_end_crawl_with_real_http() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let home_mock = server.mock(|when, then| {
        when.method(GET).path("/en/");
        then.status(200)
            .header("Content-Type", "text/html")
            .body(HOME_PAGE);
    });
    let knife_mock = server.mock(|when, then| {
        when.method(GET).path("/en/cases/open/knife");
        then.status(200)
            .header("Content-Type", "text/html")
            .body(case_page("Knife", "10.00", &[("20.00", "10"), ("5.00", "50"), ("0.00", "40")]));
    });
    let diamond_mock = server.mock(|when, then| {
        when.method(GET).path("/en/cases/open/diamond");
        then.status(200)
            .header("Content-Type", "text/html")
            .body(case_page("Diamond", "2.50", &[("30.00", "5"), ("1.00", "95")]));
    });
    let retired_mock = server.mock(|when, then| {
        when.method(GET).path("/en/cases/open/retired");
        then.status(404);
    });

    let config = site_config(&server, &output_path);
    let storage = LocalStorage::new(output_path.clone());
    let store = CsvStatsStore::new(storage.clone(), "stats_.csv".to_string(), false);
    let extractor = HtmlPageExtractor::from_config(&config, Duration::ZERO).unwrap();
    let crawl = CrawlOrchestrator::new(extractor, store, storage.clone(), config);

    let report = crawl.run().await.unwrap();

    home_mock.assert();
    knife_mock.assert();
    diamond_mock.assert();
    retired_mock.assert();

    assert_eq!(report.summary.discovered, 3);
    assert_eq!(report.summary.scraped, 2);
    assert_eq!(report.summary.not_found, 1);

    let knife = &report.stats["Knife"];
    assert!((knife.expected_return_dollars - 4.5).abs() < 1e-9);
    assert!((knife.profit_chance - 10.0).abs() < 1e-9);
    assert_eq!(knife.source_url, server.url("/en/cases/open/knife"));

    let out = temp_dir.path();
    assert!(out.join("stats_.csv").exists());
    assert!(out.join("stats_expected_percent_profit.csv").exists());
    assert!(out.join("max-min-stats.txt").exists());
    assert!(out.join("cases/knife.txt").exists());
    assert!(!out.join("cases/retired.txt").exists());

    let ranked = std::fs::read_to_string(out.join("stats_expected_percent_profit.csv")).unwrap();
    let lines: Vec<&str> = ranked.lines().collect();
    assert!(lines[0].starts_with("rank,name,case_price,"));
    assert!(lines[1].starts_with("1,Diamond,"));
    assert!(lines[2].starts_with("2,Knife,"));

    let summary = std::fs::read_to_string(out.join("max-min-stats.txt")).unwrap();
    assert!(summary.contains("Top 2 cases for expected profit as a percent of case price"));
}

#[tokio::test]
async fn test_resumed_crawl_skips_known_cases() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/en/");
        then.status(200).body(HOME_PAGE);
    });
    let knife_mock = server.mock(|when, then| {
        when.method(GET).path("/en/cases/open/knife");
        then.status(200)
            .body(case_page("Knife", "10.00", &[("20.00", "10"), ("0.00", "90")]));
    });
    let diamond_mock = server.mock(|when, then| {
        when.method(GET).path("/en/cases/open/diamond");
        then.status(200)
            .body(case_page("Diamond", "2.50", &[("30.00", "5"), ("1.00", "95")]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/en/cases/open/retired");
        then.status(404);
    });

    // First pass writes the snapshot.
    let config = site_config(&server, &output_path);
    let storage = LocalStorage::new(output_path.clone());
    let store = CsvStatsStore::new(storage.clone(), "stats_.csv".to_string(), false);
    let extractor = HtmlPageExtractor::from_config(&config, Duration::ZERO).unwrap();
    CrawlOrchestrator::new(extractor, store, storage.clone(), config.clone())
        .run()
        .await
        .unwrap();
    assert_eq!(knife_mock.hits(), 1);

    // Second pass resumes from it.
    let mut resumed = config;
    resumed.crawl.refresh = false;
    let store = CsvStatsStore::new(storage.clone(), "stats_.csv".to_string(), false);
    let extractor = HtmlPageExtractor::from_config(&resumed, Duration::ZERO).unwrap();
    let report = CrawlOrchestrator::new(extractor, store, storage.clone(), resumed)
        .run()
        .await
        .unwrap();

    assert_eq!(knife_mock.hits(), 1);
    assert_eq!(diamond_mock.hits(), 1);
    assert_eq!(report.summary.skipped, 2);
    // Not-found cases have no snapshot entry, so they are tried again.
    assert_eq!(report.summary.not_found, 1);
    assert_eq!(report.stats.len(), 2);
}

#[tokio::test]
async fn test_missing_snapshot_loads_empty() {
    let temp_dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    let store = CsvStatsStore::new(storage, "stats_.csv".to_string(), false);

    let stats = tokio_test::assert_ok!(store.load().await);
    assert!(stats.is_empty());
}

#[tokio::test]
async fn test_slow_case_page_times_out() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/en/cases/open/slow");
        then.status(200)
            .delay(Duration::from_secs(3))
            .body(case_page("Slow", "1.00", &[("1.00", "100")]));
    });

    let extractor = HtmlPageExtractor::new(
        server.url("/en/"),
        Duration::from_secs(1),
        Duration::ZERO,
    )
    .unwrap();

    let err = extractor
        .extract_case(&server.url("/en/cases/open/slow"))
        .await
        .unwrap_err();
    assert!(matches!(err, CaseOddsError::TimeoutError { .. }));
}

#[tokio::test]
async fn test_not_found_marker_page() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/en/cases/open/gone");
        then.status(200)
            .body(r#"<html><body><div class="wrap-404">Page not found</div></body></html>"#);
    });

    let extractor =
        HtmlPageExtractor::new(server.url("/en/"), Duration::from_secs(5), Duration::ZERO).unwrap();
    let outcome = extractor
        .extract_case(&server.url("/en/cases/open/gone"))
        .await
        .unwrap();

    assert_eq!(outcome, PageOutcome::NotFound);
}

#[tokio::test]
async fn test_home_page_error_yields_no_urls() {
    let server = MockServer::start();
    let home_mock = server.mock(|when, then| {
        when.method(GET).path("/en/");
        then.status(503);
    });

    let extractor =
        HtmlPageExtractor::new(server.url("/en/"), Duration::from_secs(5), Duration::ZERO).unwrap();
    let urls = extractor.discover_case_urls().await.unwrap();

    home_mock.assert();
    assert!(urls.is_empty());
}
