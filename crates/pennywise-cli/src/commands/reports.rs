//! Report command implementations

use anyhow::Result;
use pennywise_core::Database;

use super::truncate;

pub fn cmd_report_merchants(db: &Database, user_id: i64, limit: i64) -> Result<()> {
    let user = db.require_user(user_id)?;
    let report = db.get_top_merchants(user_id, limit.max(1))?;

    println!();
    println!("🏪 Top Merchants for {}", user.name);
    println!("   ─────────────────────────────────────────────────────────────");

    if report.merchants.is_empty() {
        println!("   No spending found.");
        return Ok(());
    }

    println!(
        "   {:3} │ {:30} │ {:>10} │ {:>5} │ {:>5}",
        "#", "Merchant", "Amount", "Txns", "Items"
    );
    println!("   ────┼────────────────────────────────┼────────────┼───────┼───────");

    for (i, merchant) in report.merchants.iter().enumerate() {
        println!(
            "   {:>3} │ {:30} │ {:>10.2} │ {:>5} │ {:>5}",
            i + 1,
            truncate(&merchant.merchant, 30),
            merchant.amount,
            merchant.transaction_count,
            merchant.item_count
        );
    }

    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Total: {:.2}", report.total);

    Ok(())
}
