//! Pennywise Core Library
//!
//! Shared functionality for the Pennywise savings comparison tool:
//! - Database access and migrations (users, transactions, line items)
//! - JSON and CSV transaction import with deduplication
//! - Savings comparison engine (matching, frequency savings, monthly
//!   history, investment projection)
//! - Merchant reports and store statistics

pub mod db;
pub mod error;
pub mod import;
pub mod models;
pub mod savings;

/// Test utilities: in-memory transaction store and fixtures
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use db::{Database, SeedSummary, TransactionInsertResult};
pub use error::{Error, Result};
pub use import::{ImportFormat, ImportSummary};
pub use savings::{
    EngineConfig, SavingsEngine, SavingsHistory, SavingsProjection, TransactionStore,
};
