//! Expected-value economics of a single case.
//!
//! Every percent field divides by the case price and falls back to a flat `100`
//! when the price is zero, which keeps rankings total over free cases.

use crate::domain::model::{Case, Item, Stats};

const ZERO_PRICE_PERCENT: f64 = 100.0;

pub fn compute(case_price: f64, items: &[Item], source_url: &str) -> Stats {
    // Folding from +0.0 keeps an empty sum from coming out as -0.0.
    let expected_return = items
        .iter()
        .fold(0.0, |acc, i| acc + i.price * i.probability);
    let expected_profit = expected_return - case_price;

    let deltas: Vec<f64> = items.iter().map(|i| i.price - case_price).collect();

    let min_profit = deltas
        .iter()
        .copied()
        .filter(|d| *d >= 0.0)
        .min_by(f64::total_cmp);

    // Only the present/absent split of `min_profit` picks the fallback, so a free
    // case with a profitable item gets no percent at all.
    let min_profit_percent = match min_profit {
        Some(profit) if case_price != 0.0 => Some(profit / case_price * 100.0),
        Some(_) => None,
        None => Some(ZERO_PRICE_PERCENT),
    };

    let min_loss = deltas
        .iter()
        .copied()
        .filter(|d| *d < 0.0)
        .max_by(f64::total_cmp)
        .unwrap_or(0.0);

    let nonprofit_prices: Vec<f64> = items
        .iter()
        .filter(|i| i.price - case_price <= 0.0)
        .map(|i| i.price)
        .collect();
    let avg_nonprofit_loss = if nonprofit_prices.is_empty() {
        0.0 - case_price
    } else {
        nonprofit_prices.iter().fold(0.0, |acc: f64, p| acc + *p) / nonprofit_prices.len() as f64
    };

    let profit_chance = 100.0
        * items
            .iter()
            .filter(|i| i.price - case_price >= 0.0)
            .fold(0.0, |acc, i| acc + i.probability);

    let lowest_price = items
        .iter()
        .map(|i| i.price)
        .min_by(f64::total_cmp)
        .unwrap_or(0.0);
    let highest_price = items
        .iter()
        .map(|i| i.price)
        .max_by(f64::total_cmp)
        .unwrap_or(0.0);
    let max_loss = (case_price - lowest_price).abs();
    let max_gain = (case_price - highest_price).abs();

    Stats {
        case_price,
        expected_return_dollars: expected_return,
        expected_profit_dollars: expected_profit,
        expected_percent_return: percent_of(expected_return, case_price),
        expected_percent_profit: percent_of(expected_profit, case_price),
        min_profit,
        min_profit_percent,
        profit_chance,
        avg_nonprofit_loss,
        min_loss,
        min_loss_percent: percent_of(min_loss, case_price),
        max_loss,
        max_loss_percent: percent_of(max_loss, case_price),
        max_gain,
        max_gain_percent: percent_of(max_gain, case_price),
        source_url: source_url.to_string(),
    }
}

pub fn compute_case(case: &Case) -> Stats {
    compute(case.price, &case.items, &case.source_url)
}

/// Sum of drop probabilities; a well-formed case stays at or below 1.
pub fn probability_mass(items: &[Item]) -> f64 {
    items.iter().fold(0.0, |acc, i| acc + i.probability)
}

fn percent_of(value: f64, case_price: f64) -> f64 {
    if case_price != 0.0 {
        value / case_price * 100.0
    } else {
        ZERO_PRICE_PERCENT
    }
}
