use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One possible drop from a case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub price: f64,
    pub probability: f64,
}

impl Item {
    pub fn new(price: f64, probability: f64) -> Self {
        Self { price, probability }
    }
}

/// A scraped case. A fresh scrape always produces a fresh `Case`.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub identifier: String,
    pub source_url: String,
    pub price: f64,
    pub items: Vec<Item>,
}

/// What a case page yielded before it was attached to a URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedCase {
    pub name: String,
    pub price: f64,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    Found(ScrapedCase),
    NotFound,
}

/// Derived economics of one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub case_price: f64,
    pub expected_return_dollars: f64,
    pub expected_profit_dollars: f64,
    pub expected_percent_return: f64,
    pub expected_percent_profit: f64,
    pub min_profit: Option<f64>,
    pub min_profit_percent: Option<f64>,
    pub profit_chance: f64,
    pub avg_nonprofit_loss: f64,
    pub min_loss: f64,
    pub min_loss_percent: f64,
    pub max_loss: f64,
    pub max_loss_percent: f64,
    pub max_gain: f64,
    pub max_gain_percent: f64,
    #[serde(rename = "url")]
    pub source_url: String,
}

/// Case name to stats. Ordered so that ranking ties break deterministically.
pub type StatsMap = BTreeMap<String, Stats>;

/// A rankable `Stats` field. Every field except `case_price` and `source_url`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    ExpectedReturnDollars,
    ExpectedProfitDollars,
    ExpectedPercentReturn,
    ExpectedPercentProfit,
    MinProfit,
    MinProfitPercent,
    ProfitChance,
    AvgNonprofitLoss,
    MinLoss,
    MinLossPercent,
    MaxLoss,
    MaxLossPercent,
    MaxGain,
    MaxGainPercent,
}

impl Metric {
    pub const ALL: [Metric; 14] = [
        Metric::ExpectedReturnDollars,
        Metric::ExpectedProfitDollars,
        Metric::ExpectedPercentReturn,
        Metric::ExpectedPercentProfit,
        Metric::MinProfit,
        Metric::MinProfitPercent,
        Metric::ProfitChance,
        Metric::AvgNonprofitLoss,
        Metric::MinLoss,
        Metric::MinLossPercent,
        Metric::MaxLoss,
        Metric::MaxLossPercent,
        Metric::MaxGain,
        Metric::MaxGainPercent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::ExpectedReturnDollars => "expected_return_dollars",
            Metric::ExpectedProfitDollars => "expected_profit_dollars",
            Metric::ExpectedPercentReturn => "expected_percent_return",
            Metric::ExpectedPercentProfit => "expected_percent_profit",
            Metric::MinProfit => "min_profit",
            Metric::MinProfitPercent => "min_profit_percent",
            Metric::ProfitChance => "profit_chance",
            Metric::AvgNonprofitLoss => "avg_nonprofit_loss",
            Metric::MinLoss => "min_loss",
            Metric::MinLossPercent => "min_loss_percent",
            Metric::MaxLoss => "max_loss",
            Metric::MaxLossPercent => "max_loss_percent",
            Metric::MaxGain => "max_gain",
            Metric::MaxGainPercent => "max_gain_percent",
        }
    }

    /// `None` only for the two optional profit fields.
    pub fn value(&self, stats: &Stats) -> Option<f64> {
        match self {
            Metric::ExpectedReturnDollars => Some(stats.expected_return_dollars),
            Metric::ExpectedProfitDollars => Some(stats.expected_profit_dollars),
            Metric::ExpectedPercentReturn => Some(stats.expected_percent_return),
            Metric::ExpectedPercentProfit => Some(stats.expected_percent_profit),
            Metric::MinProfit => stats.min_profit,
            Metric::MinProfitPercent => stats.min_profit_percent,
            Metric::ProfitChance => Some(stats.profit_chance),
            Metric::AvgNonprofitLoss => Some(stats.avg_nonprofit_loss),
            Metric::MinLoss => Some(stats.min_loss),
            Metric::MinLossPercent => Some(stats.min_loss_percent),
            Metric::MaxLoss => Some(stats.max_loss),
            Metric::MaxLossPercent => Some(stats.max_loss_percent),
            Metric::MaxGain => Some(stats.max_gain),
            Metric::MaxGainPercent => Some(stats.max_gain_percent),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown ranking metric: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Highest value first.
    #[default]
    Top,
    /// Lowest value first.
    Bottom,
}

/// One line of a ranking, `rank` starting at 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub name: String,
    pub stats: Stats,
}
