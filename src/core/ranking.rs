use crate::domain::model::{Direction, Metric, RankedEntry, Stats, StatsMap};
use std::cmp::Ordering;

/// The first `x` cases by `metric`, highest first for `Top` and lowest first for `Bottom`.
pub fn top_x_by(stats: &StatsMap, metric: Metric, x: usize, direction: Direction) -> Vec<RankedEntry> {
    let mut sorted = sorted_by(stats, metric);
    if direction == Direction::Bottom {
        sorted.reverse();
    }

    sorted
        .into_iter()
        .take(x)
        .enumerate()
        .map(|(i, (name, stats))| RankedEntry {
            rank: i + 1,
            name: name.clone(),
            stats: stats.clone(),
        })
        .collect()
}

/// Every case ordered by `metric` descending.
pub fn rank_all(stats: &StatsMap, metric: Metric) -> Vec<RankedEntry> {
    top_x_by(stats, metric, stats.len(), Direction::Top)
}

// Stable ascending sort, then reversed: equal values come out in reverse map order.
fn sorted_by(stats: &StatsMap, metric: Metric) -> Vec<(&String, &Stats)> {
    let mut entries: Vec<(&String, &Stats)> = stats.iter().collect();
    entries.sort_by(|a, b| compare_values(metric.value(a.1), metric.value(b.1)));
    entries.reverse();
    entries
}

// Absent values sort below every present value.
fn compare_values(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
