//! Transaction command implementations (list, reset)

use std::io::{self, Write};

use anyhow::Result;
use pennywise_core::models::TransactionSource;
use pennywise_core::savings::config::parse_source_filter;
use pennywise_core::Database;

use super::truncate;

pub fn cmd_transactions_list(
    db: &Database,
    user_id: i64,
    source: Option<&str>,
    limit: i64,
) -> Result<()> {
    let user = db.require_user(user_id)?;
    let source = source.map(parse_source_filter).transpose()?.flatten();
    let transactions = db.recent_user_transactions(user_id, source, limit.max(1))?;

    if transactions.is_empty() {
        println!("No transactions found for {}. Import some with:", user.name);
        println!("  pennywise import --file purchases.csv --user {}", user.id);
        return Ok(());
    }

    println!();
    println!("📝 Recent Transactions for {}", user.name);
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        println!(
            "   {} │ {:>10.2} │ {:8} │ {}",
            tx.timestamp.format("%Y-%m-%d"),
            tx.total(),
            tx.source.as_str(),
            truncate(&tx.merchant, 30)
        );
        for item in &tx.items {
            println!(
                "              {:>3} × {:30} {:>8.2}",
                item.quantity,
                truncate(&item.name, 30),
                item.unit_price
            );
        }
    }

    Ok(())
}

pub fn cmd_reset(db: &Database, source: &str, user_id: Option<i64>, yes: bool) -> Result<()> {
    let source: TransactionSource = source.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let scope = match user_id {
        Some(id) => format!("user #{}", db.require_user(id)?.id),
        None => "all users".to_string(),
    };

    if !yes {
        print!(
            "⚠️  This will delete every '{}' transaction for {}.\n\n",
            source, scope
        );
        print!("Are you sure? [y/N] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let deleted = db.delete_transactions_by_source(source, user_id)?;
    println!(
        "✅ Deleted {} '{}' transactions for {}",
        deleted, source, scope
    );

    Ok(())
}
