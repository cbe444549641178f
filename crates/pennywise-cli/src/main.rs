//! Pennywise CLI - Savings comparison engine
//!
//! Usage:
//!   pennywise init                               Initialize database
//!   pennywise import --file items.csv --user 2   Import transactions
//!   pennywise history --user 1 --against 2       Monthly savings
//!   pennywise serve --port 3000                  Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
        Commands::Users { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(UsersAction::List) => commands::cmd_users_list(&db),
                Some(UsersAction::Add { name, balance }) => {
                    commands::cmd_users_add(&db, &name, balance)
                }
            }
        }
        Commands::Import {
            file,
            user,
            source,
            format,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_import(&db, &file, user, &source, format.as_deref())
        }
        Commands::Transactions {
            user,
            source,
            limit,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_transactions_list(&db, user, source.as_deref(), limit)
        }
        Commands::Reset { source, user, yes } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_reset(&db, &source, user, yes)
        }
        Commands::Seed => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_seed(&db)
        }
        Commands::Compare {
            against,
            file,
            transaction,
            json,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(config_path)?;
            let input = match (file, transaction) {
                (Some(path), _) => commands::CompareInput::File(path),
                (None, Some(id)) => commands::CompareInput::Transaction(id),
                (None, None) => anyhow::bail!("Pass --file or --transaction"),
            };
            commands::cmd_compare(&db, config, against, input, json)
        }
        Commands::Frequency { pair } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(config_path)?;
            commands::cmd_frequency(&db, config, pair.user, pair.against, pair.json)
        }
        Commands::History { pair } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(config_path)?;
            commands::cmd_history(&db, config, pair.user, pair.against, pair.json)
        }
        Commands::Project { pair, as_of } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(config_path)?;
            let today = commands::parse_as_of(as_of.as_deref())?;
            commands::cmd_project(&db, config, pair.user, pair.against, today, pair.json)
        }
        Commands::Report { report_type } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match report_type {
                ReportType::Merchants { user, limit } => {
                    commands::cmd_report_merchants(&db, user, limit)
                }
            }
        }
        Commands::Serve {
            port,
            host,
            no_auth,
        } => {
            let config = commands::load_config(config_path)?;
            commands::cmd_serve(&cli.db, &host, port, no_auth, cli.no_encrypt, config).await
        }
    }
}
