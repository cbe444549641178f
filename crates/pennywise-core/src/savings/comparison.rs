//! Point-in-time and frequency-based savings
//!
//! Frequency savings extrapolate with `savings_per_unit * (frequency / 3)`.
//! The divisor treats the purchase count as covering three purchase cycles.
//! It is a product heuristic paired with the three-purchase threshold, not a
//! statistical forecast, and is kept as is.

use std::collections::BTreeMap;

use serde::Serialize;

use super::matcher::{match_item, MatchedItem, PurchasedItem};
use super::normalize::normalize_item_name;
use super::pool::PricePool;
use super::round2;
use crate::models::Transaction;

/// Cycles a purchase count is assumed to cover when extrapolating
pub const EXTRAPOLATION_CYCLES: f64 = 3.0;

/// Default summed quantity before an item counts as frequent
pub const DEFAULT_FREQUENCY_THRESHOLD: i64 = 3;

/// Savings found for one submitted list of items
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    /// Only items with a strictly cheaper price, in submission order
    pub items: Vec<MatchedItem>,
    pub items_compared: usize,
    pub items_matched: usize,
    pub total_spent: f64,
    pub total_savings: f64,
}

/// Run the matcher over every item and sum the savings
pub fn compare_items(pool: &PricePool, purchased: &[PurchasedItem]) -> ComparisonResult {
    let items: Vec<MatchedItem> = purchased
        .iter()
        .filter_map(|item| match_item(pool, item))
        .collect();

    let total_spent = round2(purchased.iter().map(|i| i.total_price).sum());
    let total_savings = round2(items.iter().map(|m| m.savings).sum());

    ComparisonResult {
        items_compared: purchased.len(),
        items_matched: items.len(),
        items,
        total_spent,
        total_savings,
    }
}

/// An item bought often enough to extrapolate savings from
#[derive(Debug, Clone, Serialize)]
pub struct FrequentItemSavings {
    pub item_name: String,
    /// Summed quantity across the subject's history
    pub frequency: i64,
    /// Quantity-weighted average unit price paid
    pub average_price: f64,
    pub cheapest_price: f64,
    pub merchant: String,
    pub location: Option<String>,
    pub savings_per_unit: f64,
    pub monthly_savings: f64,
    pub annual_savings: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FrequencyReport {
    pub items: Vec<FrequentItemSavings>,
    pub total_monthly_savings: f64,
    pub total_annual_savings: f64,
}

#[derive(Default)]
struct ItemHistory {
    quantity: i64,
    spent: f64,
}

/// Extrapolate savings for items whose summed quantity reaches `threshold`
///
/// Only exact-name matches count here and the comparison price is the single
/// cheapest observation. Items are ordered by annual savings, largest first,
/// then by name.
pub fn frequency_savings(
    pool: &PricePool,
    history: &[Transaction],
    threshold: i64,
) -> FrequencyReport {
    let mut grouped: BTreeMap<String, ItemHistory> = BTreeMap::new();
    for tx in history {
        for item in &tx.items {
            let key = normalize_item_name(&item.name);
            if key.is_empty() || item.quantity < 1 {
                continue;
            }
            let entry = grouped.entry(key).or_default();
            entry.quantity += item.quantity;
            entry.spent += item.unit_price * item.quantity as f64;
        }
    }

    let mut items = Vec::new();
    for (name, seen) in grouped {
        if seen.quantity < threshold {
            continue;
        }
        let Some(cheapest) = pool.cheapest(&name) else {
            continue;
        };
        let average_price = seen.spent / seen.quantity as f64;
        let savings_per_unit = average_price - cheapest.unit_price;
        if savings_per_unit <= 0.0 {
            continue;
        }

        let monthly = savings_per_unit * (seen.quantity as f64 / EXTRAPOLATION_CYCLES);
        let annual = monthly * 12.0;
        items.push(FrequentItemSavings {
            item_name: name,
            frequency: seen.quantity,
            average_price: round2(average_price),
            cheapest_price: cheapest.unit_price,
            merchant: cheapest.merchant.clone(),
            location: cheapest.location.clone(),
            savings_per_unit: round2(savings_per_unit),
            monthly_savings: round2(monthly),
            annual_savings: round2(annual),
        });
    }

    items.sort_by(|a, b| {
        b.annual_savings
            .total_cmp(&a.annual_savings)
            .then_with(|| a.item_name.cmp(&b.item_name))
    });

    FrequencyReport {
        total_monthly_savings: round2(items.iter().map(|i| i.monthly_savings).sum()),
        total_annual_savings: round2(items.iter().map(|i| i.annual_savings).sum()),
        items,
    }
}
