//! User command implementations

use anyhow::Result;
use pennywise_core::Database;

use super::truncate;

pub fn cmd_users_list(db: &Database) -> Result<()> {
    let users = db.list_users()?;

    if users.is_empty() {
        println!("No users yet. Add one with:");
        println!("  pennywise users add --name Alex");
        return Ok(());
    }

    println!();
    println!("👥 Users");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   {:>4} │ {:30} │ {:>10}", "ID", "Name", "Balance");
    println!("   ─────┼────────────────────────────────┼───────────");

    for user in users {
        println!(
            "   {:>4} │ {:30} │ {:>10.2}",
            user.id,
            truncate(&user.name, 30),
            user.balance
        );
    }

    Ok(())
}

pub fn cmd_users_add(db: &Database, name: &str, balance: f64) -> Result<()> {
    if let Some(existing) = db.get_user_by_name(name)? {
        println!(
            "User '{}' already exists as #{} (balance {:.2} unchanged)",
            existing.name, existing.id, existing.balance
        );
        return Ok(());
    }
    let id = db.upsert_user(name, balance)?;
    println!("✅ Added user '{}' as #{}", name.trim(), id);
    Ok(())
}
