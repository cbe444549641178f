//! Test utilities for pennywise-core
//!
//! An in-memory `TransactionStore` so the savings engine can be exercised
//! without SQLite, and a builder for transaction fixtures.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::error::Result;
use crate::models::{LineItem, Transaction, TransactionSource};
use crate::savings::TransactionStore;

/// In-memory transaction store
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: BTreeSet<i64>,
    transactions: Vec<Transaction>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&mut self, user_id: i64) {
        self.users.insert(user_id);
    }

    /// Add a transaction, registering its user if needed
    pub fn add_transaction(&mut self, tx: Transaction) {
        self.users.insert(tx.user_id);
        self.transactions.push(tx);
    }
}

impl TransactionStore for MemoryStore {
    fn user_exists(&self, user_id: i64) -> Result<bool> {
        Ok(self.users.contains(&user_id))
    }

    fn load_transactions(
        &self,
        user_id: i64,
        source: Option<TransactionSource>,
    ) -> Result<Vec<Transaction>> {
        let mut found: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|tx| tx.user_id == user_id)
            .filter(|tx| source.map_or(true, |s| tx.source == s))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        Ok(found)
    }
}

/// Builder for `Transaction` fixtures
///
/// Defaults to user 1, manual source, and noon UTC on 2024-01-01.
pub struct TransactionBuilder {
    tx: Transaction,
}

impl TransactionBuilder {
    pub fn new(id: i64, merchant: &str) -> Self {
        let timestamp = Utc
            .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Self {
            tx: Transaction {
                id,
                user_id: 1,
                merchant: merchant.to_string(),
                location: None,
                timestamp,
                source: TransactionSource::Manual,
                import_hash: None,
                items: Vec::new(),
                created_at: timestamp,
            },
        }
    }

    pub fn user(mut self, user_id: i64) -> Self {
        self.tx.user_id = user_id;
        self
    }

    /// Set the date (`YYYY-MM-DD`), keeping noon UTC
    pub fn at(mut self, date: &str) -> Self {
        if let Ok(day) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            if let Some(dt) = day.and_hms_opt(12, 0, 0) {
                self.tx.timestamp = dt.and_utc();
            }
        }
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.tx.timestamp = timestamp;
        self
    }

    pub fn location(mut self, location: &str) -> Self {
        self.tx.location = Some(location.to_string());
        self
    }

    pub fn source(mut self, source: TransactionSource) -> Self {
        self.tx.source = source;
        self
    }

    /// Append a line item; total is `unit_price * quantity`
    pub fn item(mut self, name: &str, quantity: i64, unit_price: f64) -> Self {
        let id = self.tx.id * 100 + self.tx.items.len() as i64;
        self.tx.items.push(LineItem {
            id,
            transaction_id: self.tx.id,
            name: name.to_string(),
            quantity,
            unit_price,
            total_price: unit_price * quantity as f64,
        });
        self
    }

    pub fn build(self) -> Transaction {
        self.tx
    }
}
