//! Domain models for Pennywise

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A person whose purchases are tracked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    /// Cash balance snapshot
    pub balance: f64,
    pub created_at: DateTime<Utc>,
}

/// Transaction source - how it entered the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionSource {
    /// Manually entered
    #[default]
    Manual,
    /// Derived from a scanned receipt
    Receipt,
    /// Imported from a bank transaction-sync feed
    Sync,
}

impl TransactionSource {
    pub const ALL: [TransactionSource; 3] = [Self::Manual, Self::Receipt, Self::Sync];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Receipt => "receipt",
            Self::Sync => "sync",
        }
    }
}

impl std::str::FromStr for TransactionSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "receipt" | "ocr" => Ok(Self::Receipt),
            "sync" | "import" | "imported" => Ok(Self::Sync),
            _ => Err(format!("Unknown transaction source: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One purchase event with its line items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub merchant: String,
    pub location: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub source: TransactionSource,
    pub import_hash: Option<String>,
    pub items: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Sum of line totals
    pub fn total(&self) -> f64 {
        self.items.iter().map(|i| i.total_price).sum()
    }
}

/// One product line within a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: i64,
    pub transaction_id: i64,
    pub name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
}

/// New transaction for insertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    pub merchant: String,
    #[serde(default)]
    pub location: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub source: TransactionSource,
    #[serde(default)]
    pub import_hash: Option<String>,
    #[serde(default)]
    pub items: Vec<NewLineItem>,
}

impl NewTransaction {
    /// Reject transactions that cannot be stored
    pub fn validate(&self) -> Result<()> {
        if self.merchant.trim().is_empty() {
            return Err(Error::InvalidInput("Merchant cannot be empty".to_string()));
        }
        for item in &self.items {
            item.validate()?;
        }
        Ok(())
    }
}

/// New line item for insertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    pub unit_price: f64,
    /// Defaults to `unit_price * quantity` when absent
    #[serde(default)]
    pub total_price: Option<f64>,
}

fn default_quantity() -> i64 {
    1
}

impl NewLineItem {
    pub fn new(name: impl Into<String>, quantity: i64, unit_price: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
            total_price: None,
        }
    }

    pub fn with_total(mut self, total_price: f64) -> Self {
        self.total_price = Some(total_price);
        self
    }

    /// Total price as supplied, or computed from unit price and quantity
    pub fn resolved_total(&self) -> f64 {
        self.total_price
            .unwrap_or(self.unit_price * self.quantity as f64)
    }

    /// Reject items that cannot be stored or compared
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput("Item name cannot be empty".to_string()));
        }
        if self.quantity < 1 {
            return Err(Error::InvalidInput(format!(
                "Quantity for '{}' must be at least 1",
                self.name
            )));
        }
        if !self.unit_price.is_finite() || self.unit_price < 0.0 {
            return Err(Error::InvalidInput(format!(
                "Unit price for '{}' must be a non-negative number",
                self.name
            )));
        }
        if let Some(total) = self.total_price {
            if !total.is_finite() || total < 0.0 {
                return Err(Error::InvalidInput(format!(
                    "Total price for '{}' must be a non-negative number",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

/// Spending at one merchant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantSummary {
    pub merchant: String,
    pub amount: f64,
    pub transaction_count: i64,
    pub item_count: i64,
}

/// Merchant breakdown for one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantsReport {
    pub user_id: i64,
    pub limit: i64,
    pub total: f64,
    pub merchants: Vec<MerchantSummary>,
}

/// Row counts per provenance tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceCount {
    pub source: TransactionSource,
    pub transactions: i64,
    pub line_items: i64,
}

/// Store-wide counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub users: i64,
    pub transactions: i64,
    pub line_items: i64,
    pub by_source: Vec<SourceCount>,
}
