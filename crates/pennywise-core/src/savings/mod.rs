//! Savings comparison engine
//!
//! Answers "how much could the subject user have saved by paying the prices
//! the comparison user paid", and what those savings would be worth if
//! invested. Everything is recomputed from the transaction store on each call.
//!
//! The pieces:
//! - `normalize` - item name keys and the token-overlap heuristic
//! - `pool` - comparison prices by normalized name
//! - `matcher` - exact-then-fuzzy matching of one purchased item
//! - `comparison` - point-in-time and frequency-based savings
//! - `history` - savings bucketed by UTC calendar month
//! - `projection` - naive compound growth of monthly savings
//! - `config` - engine tunables loaded from TOML

pub mod comparison;
pub mod config;
pub mod history;
pub mod matcher;
pub mod normalize;
pub mod pool;
pub mod projection;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{NewLineItem, Transaction, TransactionSource};

pub use comparison::{
    compare_items, frequency_savings, ComparisonResult, FrequencyReport, FrequentItemSavings,
};
pub use config::EngineConfig;
pub use history::{month_key, monthly_history, MonthlySavings};
pub use matcher::{match_item, MatchKind, MatchedItem, PurchasedItem};
pub use normalize::normalize_item_name;
pub use pool::{PriceObservation, PricePool};
pub use projection::{project_growth, InvestmentProjection, MonthlyProjection};

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Where the engine reads purchase histories from
///
/// Transactions come back ordered by timestamp then id, each with its items
/// ordered by id.
pub trait TransactionStore {
    fn user_exists(&self, user_id: i64) -> Result<bool>;

    fn load_transactions(
        &self,
        user_id: i64,
        source: Option<TransactionSource>,
    ) -> Result<Vec<Transaction>>;
}

impl TransactionStore for Database {
    fn user_exists(&self, user_id: i64) -> Result<bool> {
        Ok(self.get_user(user_id)?.is_some())
    }

    fn load_transactions(
        &self,
        user_id: i64,
        source: Option<TransactionSource>,
    ) -> Result<Vec<Transaction>> {
        self.list_user_transactions(user_id, source)
    }
}

/// Monthly savings for a subject measured against a comparison user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsHistory {
    pub subject_user_id: i64,
    pub comparison_user_id: i64,
    pub total_savings: f64,
    /// Most recent month first
    pub months: Vec<MonthlySavings>,
}

/// Monthly history plus its projected growth
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsProjection {
    pub history: SavingsHistory,
    pub projection: InvestmentProjection,
}

/// Savings engine over an injected transaction store
pub struct SavingsEngine<'a, S: TransactionStore + ?Sized> {
    store: &'a S,
    config: EngineConfig,
}

impl<'a, S: TransactionStore + ?Sized> SavingsEngine<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: &'a S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn require_user(&self, user_id: i64) -> Result<()> {
        if self.store.user_exists(user_id)? {
            Ok(())
        } else {
            Err(Error::NotFound(format!("User {} not found", user_id)))
        }
    }

    fn require_pair(&self, subject_id: i64, comparison_id: i64) -> Result<()> {
        if subject_id == comparison_id {
            return Err(Error::InvalidInput(
                "Subject and comparison user must differ".to_string(),
            ));
        }
        self.require_user(subject_id)?;
        self.require_user(comparison_id)
    }

    /// Comparison prices from the configured provenance
    pub fn price_pool(&self, comparison_id: i64) -> Result<PricePool> {
        self.require_user(comparison_id)?;
        let transactions = self
            .store
            .load_transactions(comparison_id, self.config.comparison_source)?;
        let pool = PricePool::from_transactions(&transactions);
        debug!(
            comparison_id,
            transactions = transactions.len(),
            keys = pool.len(),
            observations = pool.observation_count(),
            "Built price pool"
        );
        Ok(pool)
    }

    /// Compare a submitted list of items, e.g. one receipt
    pub fn compare(&self, comparison_id: i64, items: &[NewLineItem]) -> Result<ComparisonResult> {
        if items.is_empty() {
            return Err(Error::InvalidInput("Item list cannot be empty".to_string()));
        }
        for item in items {
            item.validate()?;
        }
        let purchased: Vec<PurchasedItem> = items.iter().map(PurchasedItem::from).collect();
        self.compare_purchased(comparison_id, &purchased)
    }

    /// Compare a stored transaction against another user's prices
    ///
    /// The transaction's owner is the subject, so pricing it against the
    /// owner's own history is rejected.
    pub fn compare_transaction(
        &self,
        transaction: &Transaction,
        comparison_id: i64,
    ) -> Result<ComparisonResult> {
        self.require_pair(transaction.user_id, comparison_id)?;
        let purchased: Vec<PurchasedItem> =
            transaction.items.iter().map(PurchasedItem::from).collect();
        self.compare_purchased(comparison_id, &purchased)
    }

    fn compare_purchased(
        &self,
        comparison_id: i64,
        items: &[PurchasedItem],
    ) -> Result<ComparisonResult> {
        let pool = self.price_pool(comparison_id)?;
        let result = compare_items(&pool, items);
        debug!(
            comparison_id,
            compared = result.items_compared,
            matched = result.items_matched,
            total_savings = result.total_savings,
            "Compared items"
        );
        Ok(result)
    }

    /// Extrapolated savings on items the subject buys often
    pub fn frequency(&self, subject_id: i64, comparison_id: i64) -> Result<FrequencyReport> {
        self.require_pair(subject_id, comparison_id)?;
        let pool = self.price_pool(comparison_id)?;
        let history = self.store.load_transactions(subject_id, None)?;
        let report = frequency_savings(&pool, &history, self.config.frequency_threshold);
        debug!(
            subject_id,
            comparison_id,
            frequent_items = report.items.len(),
            "Computed frequency savings"
        );
        Ok(report)
    }

    /// Savings per calendar month across the subject's whole history
    pub fn history(&self, subject_id: i64, comparison_id: i64) -> Result<SavingsHistory> {
        self.require_pair(subject_id, comparison_id)?;
        let pool = self.price_pool(comparison_id)?;
        let transactions = self.store.load_transactions(subject_id, None)?;
        let months = monthly_history(&pool, &transactions);
        debug!(
            subject_id,
            comparison_id,
            transactions = transactions.len(),
            months = months.len(),
            "Computed monthly history"
        );
        Ok(SavingsHistory {
            subject_user_id: subject_id,
            comparison_user_id: comparison_id,
            total_savings: history::total_savings(&months),
            months,
        })
    }

    /// Monthly history projected to the current month
    pub fn projection(&self, subject_id: i64, comparison_id: i64) -> Result<SavingsProjection> {
        self.projection_at(subject_id, comparison_id, Utc::now().date_naive())
    }

    /// Monthly history projected to the month containing `today`
    pub fn projection_at(
        &self,
        subject_id: i64,
        comparison_id: i64,
        today: NaiveDate,
    ) -> Result<SavingsProjection> {
        let history = self.history(subject_id, comparison_id)?;
        let projection = project_growth(&history.months, self.config.annual_return_rate, today);
        Ok(SavingsProjection {
            history,
            projection,
        })
    }
}
