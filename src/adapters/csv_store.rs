use crate::core::ranking::rank_all;
use crate::core::{Metric, StatsStore, Storage};
use crate::domain::model::{Stats, StatsMap};
use crate::utils::error::{CaseOddsError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One CSV line. Column order is the published header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct StatsRow {
    rank: usize,
    name: String,
    case_price: f64,
    expected_return_dollars: f64,
    expected_profit_dollars: f64,
    expected_percent_return: f64,
    expected_percent_profit: f64,
    min_profit: Option<f64>,
    min_profit_percent: Option<f64>,
    profit_chance: f64,
    avg_nonprofit_loss: f64,
    min_loss: f64,
    min_loss_percent: f64,
    max_loss: f64,
    max_loss_percent: f64,
    max_gain: f64,
    max_gain_percent: f64,
    url: String,
}

impl StatsRow {
    fn new(rank: usize, name: &str, s: &Stats) -> Self {
        Self {
            rank,
            name: name.to_string(),
            case_price: s.case_price,
            expected_return_dollars: s.expected_return_dollars,
            expected_profit_dollars: s.expected_profit_dollars,
            expected_percent_return: s.expected_percent_return,
            expected_percent_profit: s.expected_percent_profit,
            min_profit: s.min_profit,
            min_profit_percent: s.min_profit_percent,
            profit_chance: s.profit_chance,
            avg_nonprofit_loss: s.avg_nonprofit_loss,
            min_loss: s.min_loss,
            min_loss_percent: s.min_loss_percent,
            max_loss: s.max_loss,
            max_loss_percent: s.max_loss_percent,
            max_gain: s.max_gain,
            max_gain_percent: s.max_gain_percent,
            url: s.source_url.clone(),
        }
    }

    fn into_entry(self) -> (String, Stats) {
        let stats = Stats {
            case_price: self.case_price,
            expected_return_dollars: self.expected_return_dollars,
            expected_profit_dollars: self.expected_profit_dollars,
            expected_percent_return: self.expected_percent_return,
            expected_percent_profit: self.expected_percent_profit,
            min_profit: self.min_profit,
            min_profit_percent: self.min_profit_percent,
            profit_chance: self.profit_chance,
            avg_nonprofit_loss: self.avg_nonprofit_loss,
            min_loss: self.min_loss,
            min_loss_percent: self.min_loss_percent,
            max_loss: self.max_loss,
            max_loss_percent: self.max_loss_percent,
            max_gain: self.max_gain,
            max_gain_percent: self.max_gain_percent,
            source_url: self.url,
        };
        (self.name, stats)
    }
}

/// Stats persisted as CSV files on a `Storage` backend.
pub struct CsvStatsStore<S: Storage> {
    storage: S,
    snapshot_file: String,
    include_free: bool,
}

impl<S: Storage> CsvStatsStore<S> {
    pub fn new(storage: S, snapshot_file: String, include_free: bool) -> Self {
        Self {
            storage,
            snapshot_file,
            include_free,
        }
    }

    pub fn file_name(&self, ranking: Option<Metric>) -> String {
        match ranking {
            None => self.snapshot_file.clone(),
            Some(metric) if self.include_free => format!("stats_{}_with_free.csv", metric),
            Some(metric) => format!("stats_{}.csv", metric),
        }
    }
}

pub fn to_csv(stats: &StatsMap, ranking: Option<Metric>) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    match ranking {
        Some(metric) => {
            for entry in rank_all(stats, metric) {
                writer.serialize(StatsRow::new(entry.rank, &entry.name, &entry.stats))?;
            }
        }
        None => {
            for (i, (name, s)) in stats.iter().enumerate() {
                writer.serialize(StatsRow::new(i + 1, name, s))?;
            }
        }
    }

    // An empty map still gets a header line.
    if stats.is_empty() {
        writer.write_record(HEADER)?;
    }

    writer
        .into_inner()
        .map_err(|e| CaseOddsError::IoError(e.into_error()))
}

pub fn from_csv(data: &[u8]) -> Result<StatsMap> {
    let mut reader = csv::Reader::from_reader(data);
    let mut stats = StatsMap::new();
    for row in reader.deserialize::<StatsRow>() {
        let (name, s) = row?.into_entry();
        stats.insert(name, s);
    }
    Ok(stats)
}

pub const HEADER: [&str; 18] = [
    "rank",
    "name",
    "case_price",
    "expected_return_dollars",
    "expected_profit_dollars",
    "expected_percent_return",
    "expected_percent_profit",
    "min_profit",
    "min_profit_percent",
    "profit_chance",
    "avg_nonprofit_loss",
    "min_loss",
    "min_loss_percent",
    "max_loss",
    "max_loss_percent",
    "max_gain",
    "max_gain_percent",
    "url",
];

#[async_trait]
impl<S: Storage> StatsStore for CsvStatsStore<S> {
    async fn load(&self) -> Result<StatsMap> {
        match self.storage.read_file(&self.snapshot_file).await {
            Ok(data) => {
                let stats = from_csv(&data)?;
                tracing::info!(
                    "📥 Loaded {} cases from {}",
                    stats.len(),
                    self.snapshot_file
                );
                Ok(stats)
            }
            Err(CaseOddsError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    "🔴 Resuming but {} was not found, starting from nothing",
                    self.snapshot_file
                );
                Ok(StatsMap::new())
            }
            Err(e) => Err(e),
        }
    }

    async fn save(&self, stats: &StatsMap, ranking: Option<Metric>) -> Result<String> {
        let file_name = self.file_name(ranking);
        let data = to_csv(stats, ranking)?;
        self.storage.write_file(&file_name, &data).await?;
        tracing::debug!("Wrote {} ({} rows)", file_name, stats.len());
        Ok(file_name)
    }
}
