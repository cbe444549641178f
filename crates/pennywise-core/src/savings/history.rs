//! Monthly savings history
//!
//! Buckets are calendar months of the transaction timestamp in UTC. Every
//! item in a bucket is matched against the whole comparison pool, so a price
//! observed after the purchase still counts.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::matcher::{match_item, PurchasedItem};
use super::pool::PricePool;
use super::round2;
use crate::models::Transaction;

/// Savings found in one calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySavings {
    /// `YYYY-MM`
    pub month: String,
    /// e.g. "March 2024"
    pub month_label: String,
    pub savings: f64,
    pub transaction_count: usize,
}

/// Bucket key for a timestamp
pub fn month_key(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m").to_string()
}

#[derive(Default)]
struct Bucket {
    label: String,
    savings: f64,
    transactions: usize,
}

/// Sum matched savings per month, most recent month first
pub fn monthly_history(pool: &PricePool, history: &[Transaction]) -> Vec<MonthlySavings> {
    let mut buckets: BTreeMap<String, Bucket> = BTreeMap::new();

    for tx in history {
        let bucket = buckets.entry(month_key(&tx.timestamp)).or_insert_with(|| Bucket {
            label: tx.timestamp.format("%B %Y").to_string(),
            ..Default::default()
        });
        bucket.transactions += 1;
        for item in &tx.items {
            if let Some(matched) = match_item(pool, &PurchasedItem::from(item)) {
                bucket.savings += matched.savings;
            }
        }
    }

    buckets
        .into_iter()
        .rev()
        .map(|(month, bucket)| MonthlySavings {
            month,
            month_label: bucket.label,
            savings: round2(bucket.savings),
            transaction_count: bucket.transactions,
        })
        .collect()
}

/// Sum of monthly savings, rounded to cents
pub fn total_savings(months: &[MonthlySavings]) -> f64 {
    round2(months.iter().map(|m| m.savings).sum())
}
