//! Demo data for trying out savings comparisons
//!
//! Seeds two users: "Alex" shops at convenience stores (manual and receipt
//! entries) and "Sam" buys similar groceries cheaper (sync imports). Seeding
//! is idempotent through fixed import hashes.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::Serialize;
use tracing::info;

use super::Database;
use crate::error::Result;
use crate::models::{NewLineItem, NewTransaction, TransactionSource};

/// What a seeding run created
#[derive(Debug, Clone, Serialize)]
pub struct SeedSummary {
    pub subject_user_id: i64,
    pub comparison_user_id: i64,
    pub transactions_inserted: usize,
    pub transactions_skipped: usize,
}

struct SeedPurchase {
    months_ago: i64,
    merchant: &'static str,
    location: Option<&'static str>,
    source: TransactionSource,
    items: &'static [(&'static str, i64, f64)],
}

const SUBJECT_PURCHASES: &[SeedPurchase] = &[
    SeedPurchase {
        months_ago: 3,
        merchant: "Corner Market",
        location: Some("Downtown"),
        source: TransactionSource::Receipt,
        items: &[("Whole Milk", 2, 4.29), ("Sourdough Bread", 1, 5.49), ("Eggs", 1, 6.99)],
    },
    SeedPurchase {
        months_ago: 2,
        merchant: "QuickStop",
        location: None,
        source: TransactionSource::Manual,
        items: &[("Bananas", 6, 0.45), ("Coffee Beans", 1, 14.99)],
    },
    SeedPurchase {
        months_ago: 1,
        merchant: "Corner Market",
        location: Some("Downtown"),
        source: TransactionSource::Receipt,
        items: &[("Whole Milk", 1, 4.49), ("Eggs", 1, 7.29), ("Paper Towels", 1, 8.99)],
    },
    SeedPurchase {
        months_ago: 0,
        merchant: "QuickStop",
        location: None,
        source: TransactionSource::Manual,
        items: &[("Coffee Beans", 1, 15.49), ("Greek Yogurt", 4, 1.89)],
    },
];

const COMPARISON_PURCHASES: &[SeedPurchase] = &[
    SeedPurchase {
        months_ago: 4,
        merchant: "Fresh Foods",
        location: Some("Eastside"),
        source: TransactionSource::Sync,
        items: &[("Milk", 1, 3.19), ("Bread", 1, 3.99), ("Eggs", 1, 4.99)],
    },
    SeedPurchase {
        months_ago: 2,
        merchant: "Bulk Club",
        location: Some("Airport Rd"),
        source: TransactionSource::Sync,
        items: &[("Coffee Beans", 2, 11.49), ("Paper Towels", 1, 6.49), ("Bananas", 8, 0.25)],
    },
    SeedPurchase {
        months_ago: 1,
        merchant: "Fresh Foods",
        location: Some("Eastside"),
        source: TransactionSource::Sync,
        items: &[("Yogurt", 4, 1.25), ("Eggs", 1, 4.49)],
    },
    // Manual entries are not trusted as comparison prices by default
    SeedPurchase {
        months_ago: 1,
        merchant: "Farmers Market",
        location: None,
        source: TransactionSource::Manual,
        items: &[("Eggs", 1, 1.00)],
    },
];

/// First day of the month `months_ago` months before `now`, at noon UTC
fn month_start(now: DateTime<Utc>, months_ago: i64) -> DateTime<Utc> {
    let total = now.year() as i64 * 12 + now.month0() as i64 - months_ago;
    let year = total.div_euclid(12) as i32;
    let month = total.rem_euclid(12) as u32 + 1;
    Utc.with_ymd_and_hms(year, month, 1, 12, 0, 0)
        .single()
        .unwrap_or(now)
}

impl Database {
    /// Seed demo users and purchases relative to the current month
    pub fn seed_demo_data(&self) -> Result<SeedSummary> {
        let now = Utc::now();
        let subject_user_id = self.upsert_user("Alex", 1250.0)?;
        let comparison_user_id = self.upsert_user("Sam", 3400.0)?;

        let mut inserted = 0;
        let mut skipped = 0;

        let batches = [
            ("alex", subject_user_id, SUBJECT_PURCHASES),
            ("sam", comparison_user_id, COMPARISON_PURCHASES),
        ];
        for (tag, user_id, purchases) in batches {
            for (idx, purchase) in purchases.iter().enumerate() {
                let tx = NewTransaction {
                    merchant: purchase.merchant.to_string(),
                    location: purchase.location.map(str::to_string),
                    timestamp: month_start(now, purchase.months_ago) + Duration::days(idx as i64),
                    source: purchase.source,
                    import_hash: Some(format!("seed:{}:{}", tag, idx)),
                    items: purchase
                        .items
                        .iter()
                        .map(|(name, qty, price)| NewLineItem::new(*name, *qty, *price))
                        .collect(),
                };
                if self.insert_transaction(user_id, &tx)?.is_inserted() {
                    inserted += 1;
                } else {
                    skipped += 1;
                }
            }
        }

        info!(inserted, skipped, "Seeded demo data");
        Ok(SeedSummary {
            subject_user_id,
            comparison_user_id,
            transactions_inserted: inserted,
            transactions_skipped: skipped,
        })
    }
}
