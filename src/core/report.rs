use crate::core::ranking::top_x_by;
use crate::domain::model::{Direction, Metric, Stats, StatsMap};
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use std::fmt::Write;

pub struct ReportSection {
    pub title: &'static str,
    pub metric: Metric,
    pub direction: Direction,
}

/// Summary sections. A lower loss is better, so the "top" loss section ranks ascending.
pub const SUMMARY_SECTIONS: [ReportSection; 8] = [
    ReportSection {
        title: "Top {x} cases for expected profit as a percent of case price",
        metric: Metric::ExpectedPercentProfit,
        direction: Direction::Top,
    },
    ReportSection {
        title: "Bottom {x} cases for expected profit as a percent of case price",
        metric: Metric::ExpectedPercentProfit,
        direction: Direction::Bottom,
    },
    ReportSection {
        title: "Top {x} cases for expected profit in dollars",
        metric: Metric::ExpectedProfitDollars,
        direction: Direction::Top,
    },
    ReportSection {
        title: "Bottom {x} cases for expected profit in dollars",
        metric: Metric::ExpectedProfitDollars,
        direction: Direction::Bottom,
    },
    ReportSection {
        title: "Top {x} cases for max possible loss as a percent of case price",
        metric: Metric::MaxLossPercent,
        direction: Direction::Bottom,
    },
    ReportSection {
        title: "Bottom {x} cases for max possible loss as a percent of case price",
        metric: Metric::MaxLossPercent,
        direction: Direction::Top,
    },
    ReportSection {
        title: "Top {x} cases for max possible gain as a percent of case price",
        metric: Metric::MaxGainPercent,
        direction: Direction::Top,
    },
    ReportSection {
        title: "Bottom {x} cases for max possible gain as a percent of case price",
        metric: Metric::MaxGainPercent,
        direction: Direction::Bottom,
    },
];

pub fn render_summary(stats: &StatsMap, x: usize, generated_at: DateTime<Utc>) -> Result<String> {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Case rankings over {} cases, generated {}",
        stats.len(),
        generated_at.to_rfc3339()
    );

    for section in &SUMMARY_SECTIONS {
        let ranked = top_x_by(stats, section.metric, x, section.direction);
        let _ = writeln!(out, "\n\n------------\n");
        let _ = writeln!(out, "{}", section.title.replace("{x}", &x.to_string()));
        let _ = writeln!(out, "{}", serde_json::to_string_pretty(&ranked)?);
    }

    Ok(out)
}

/// Labelled dump of every field of one case.
pub fn render_case_transcript(name: &str, stats: &Stats) -> String {
    let fields: [(&str, String); 16] = [
        ("Case Name", name.to_string()),
        ("Case Cost", stats.case_price.to_string()),
        ("Expected Return $", stats.expected_return_dollars.to_string()),
        ("Expected Profit $", stats.expected_profit_dollars.to_string()),
        ("Expected Return %", stats.expected_percent_return.to_string()),
        ("Expected Profit %", stats.expected_percent_profit.to_string()),
        ("Minimum Profit $", optional(stats.min_profit)),
        ("Minimum Profit %", optional(stats.min_profit_percent)),
        ("Minimum Loss $", stats.min_loss.to_string()),
        ("Minimum Loss %", stats.min_loss_percent.to_string()),
        ("Average Non-Profit Loss", stats.avg_nonprofit_loss.to_string()),
        ("% Chance of Profit", stats.profit_chance.to_string()),
        ("Maximum Loss $", stats.max_loss.to_string()),
        ("Maximum Loss %", stats.max_loss_percent.to_string()),
        ("Maximum Gain $", stats.max_gain.to_string()),
        ("Maximum Gain %", stats.max_gain_percent.to_string()),
    ];

    let mut out = String::new();
    for (label, value) in fields {
        let _ = writeln!(out, "{}:\n{}", label, value);
    }
    out
}

fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| "nil".to_string(), |v| v.to_string())
}
