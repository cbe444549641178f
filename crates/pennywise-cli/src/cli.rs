//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Pennywise - See what your groceries would cost elsewhere
#[derive(Parser)]
#[command(name = "pennywise")]
#[command(about = "Compare purchases against cheaper prices paid by others", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "pennywise.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set PENNYWISE_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Savings engine config (TOML); falls back to PENNYWISE_CONFIG
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Show database status
    Status,

    /// List or add users
    Users {
        #[command(subcommand)]
        action: Option<UsersAction>,
    },

    /// Import transactions from a JSON or CSV file
    Import {
        /// File to import
        #[arg(short, long)]
        file: PathBuf,

        /// User the transactions belong to
        #[arg(short, long)]
        user: i64,

        /// Provenance tag: manual, receipt, sync
        #[arg(short, long, default_value = "sync")]
        source: String,

        /// File format: json, csv (detected from extension if not specified)
        #[arg(long)]
        format: Option<String>,
    },

    /// List a user's recent transactions
    Transactions {
        #[arg(short, long)]
        user: i64,

        /// Provenance tag, or "all"
        #[arg(short, long)]
        source: Option<String>,

        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Delete transactions with one provenance tag
    Reset {
        /// Provenance tag to delete: manual, receipt, sync
        #[arg(short, long)]
        source: String,

        /// Only delete this user's transactions
        #[arg(short, long)]
        user: Option<i64>,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Seed two demo users with overlapping purchases
    Seed,

    /// Compare items against another user's prices
    Compare {
        /// Comparison user
        #[arg(short, long)]
        against: i64,

        /// JSON file with an array of {name, quantity, unit_price}
        #[arg(short, long, conflicts_with = "transaction", required_unless_present = "transaction")]
        file: Option<PathBuf>,

        /// Stored transaction whose items to compare
        #[arg(short, long)]
        transaction: Option<i64>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Extrapolated savings on frequently bought items
    Frequency {
        #[command(flatten)]
        pair: UserPair,
    },

    /// Savings per calendar month
    History {
        #[command(flatten)]
        pair: UserPair,
    },

    /// Monthly savings with projected investment growth
    Project {
        #[command(flatten)]
        pair: UserPair,

        /// Project up to this date (YYYY-MM-DD) instead of today
        #[arg(long)]
        as_of: Option<String>,
    },

    /// Generate reports
    Report {
        #[command(subcommand)]
        report_type: ReportType,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        #[arg(long)]
        no_auth: bool,
    },
}

/// Subject and comparison user for the aggregate commands
#[derive(clap::Args)]
pub struct UserPair {
    /// User whose purchases are examined
    #[arg(short, long)]
    pub user: i64,

    /// User whose prices are the benchmark
    #[arg(short, long)]
    pub against: i64,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// List users (default)
    List,

    /// Add a user (returns the existing one for a taken name)
    Add {
        #[arg(short, long)]
        name: String,

        /// Cash balance
        #[arg(short, long, default_value = "0")]
        balance: f64,
    },
}

#[derive(Subcommand)]
pub enum ReportType {
    /// Spending by merchant
    Merchants {
        #[arg(short, long)]
        user: i64,

        /// Number of merchants to show
        #[arg(short, long, default_value = "10")]
        limit: i64,
    },
}
