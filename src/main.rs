use case_odds::core::ConfigProvider;
use case_odds::utils::error::ErrorSeverity;
use case_odds::utils::{logger, validation::Validate};
use case_odds::{CliConfig, CrawlOrchestrator, CsvStatsStore, HtmlPageExtractor, LocalStorage};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting case-odds");

    // 載入並驗證配置
    let config = match cli.resolve().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };
    tracing::debug!("Crawler config: {:?}", config);

    // 創建存儲、擷取器與協調器
    let storage = LocalStorage::new(config.output_path().to_string());
    let store = CsvStatsStore::new(
        storage.clone(),
        config.output.snapshot_file.clone(),
        config.crawl.include_free,
    );
    let extractor = HtmlPageExtractor::from_config(&config, config.settle_delay())?;
    let output_path = config.output_path().to_string();
    let orchestrator = CrawlOrchestrator::new(extractor, store, storage, config);

    let result = if cli.export_only {
        orchestrator.export_only().await
    } else {
        orchestrator.run().await.map(|report| report.written)
    };

    match result {
        Ok(written) => {
            tracing::info!("✅ Wrote {} files to {}", written.len(), output_path);
            println!("✅ Wrote {} files to {}", written.len(), output_path);
        }
        Err(e) => {
            tracing::error!("❌ Crawl failed: {} (Severity: {:?})", e, e.severity());
            eprintln!("❌ {}", e.user_friendly_message());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
