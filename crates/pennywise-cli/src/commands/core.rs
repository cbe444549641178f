//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Savings engine configuration
//! - `cmd_init` - Initialize the database
//! - `cmd_seed` - Load demo users and purchases

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use pennywise_core::{Database, EngineConfig};
use tracing::debug;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db_path.display()))?;
    debug!(path = path_str, encrypted = !no_encrypt, "Opening database");
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Load engine configuration from --config, PENNYWISE_CONFIG, or defaults
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config = EngineConfig::load(path).context("Failed to load savings config")?;
    debug!(?config, "Loaded savings config");
    Ok(config)
}

/// Parse an optional YYYY-MM-DD date, defaulting to today (UTC)
pub fn parse_as_of(value: Option<&str>) -> Result<NaiveDate> {
    match value {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Invalid --as-of date '{}' (use YYYY-MM-DD)", s)),
        None => Ok(Utc::now().date_naive()),
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Add users: pennywise users add --name Alex");
    println!("  2. Import purchases: pennywise import --file purchases.csv --user 1");
    println!("  3. Or try the demo data: pennywise seed");

    Ok(())
}

pub fn cmd_seed(db: &Database) -> Result<()> {
    let summary = db.seed_demo_data().context("Failed to seed demo data")?;

    println!("🌱 Demo data");
    println!("   Subject user:    #{}", summary.subject_user_id);
    println!("   Comparison user: #{}", summary.comparison_user_id);
    println!(
        "   Transactions: {} inserted, {} already present",
        summary.transactions_inserted, summary.transactions_skipped
    );
    println!();
    println!(
        "Try: pennywise history --user {} --against {}",
        summary.subject_user_id, summary.comparison_user_id
    );

    Ok(())
}
