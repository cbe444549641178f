//! Savings command implementations (compare, frequency, history, project)

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use pennywise_core::models::NewLineItem;
use pennywise_core::savings::{
    ComparisonResult, FrequencyReport, MatchKind, SavingsHistory, SavingsProjection,
};
use pennywise_core::{Database, EngineConfig, SavingsEngine};
use serde::Serialize;

use super::truncate;

/// Where the items to compare come from
pub enum CompareInput {
    /// JSON array of `{name, quantity, unit_price}`
    File(PathBuf),
    /// A stored transaction
    Transaction(i64),
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Read a JSON item list for `compare --file`
pub fn read_items_file(path: &std::path::Path) -> Result<Vec<NewLineItem>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse item list in {}", path.display()))
}

pub fn cmd_compare(
    db: &Database,
    config: EngineConfig,
    against: i64,
    input: CompareInput,
    json: bool,
) -> Result<()> {
    let engine = SavingsEngine::with_config(db, config);
    let result = match input {
        CompareInput::File(path) => {
            let items = read_items_file(&path)?;
            engine.compare(against, &items)?
        }
        CompareInput::Transaction(id) => {
            let tx = db
                .get_transaction(id)?
                .with_context(|| format!("Transaction {} not found", id))?;
            engine.compare_transaction(&tx, against)?
        }
    };

    if json {
        return print_json(&result);
    }
    print_comparison(&result);
    Ok(())
}

fn print_comparison(result: &ComparisonResult) {
    println!();
    println!("🔎 Price Comparison");
    println!("   ─────────────────────────────────────────────────────────────");

    if result.items.is_empty() {
        println!(
            "   No cheaper prices found for {} items.",
            result.items_compared
        );
        return;
    }

    println!(
        "   {:24} │ {:>8} │ {:>9} │ {:>8} │ {}",
        "Item", "Paid", "Could pay", "Savings", "Where"
    );
    println!("   ─────────────────────────┼──────────┼───────────┼──────────┼──────────");

    for item in &result.items {
        let marker = match item.match_kind {
            MatchKind::Exact => "",
            MatchKind::Fuzzy => " ~",
        };
        println!(
            "   {:24} │ {:>8.2} │ {:>9.2} │ {:>8.2} │ {}{}",
            truncate(&item.item_name, 24),
            item.total_price,
            item.alternative_total_price,
            item.savings,
            truncate(&item.merchant, 24),
            marker
        );
    }

    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Matched {} of {} items",
        result.items_matched, result.items_compared
    );
    println!(
        "   💰 Could have saved {:.2} of {:.2}",
        result.total_savings, result.total_spent
    );
    if result.items.iter().any(|i| i.match_kind == MatchKind::Fuzzy) {
        println!("   ~ similar item name, not an exact match");
    }
}

pub fn cmd_frequency(
    db: &Database,
    config: EngineConfig,
    user_id: i64,
    against: i64,
    json: bool,
) -> Result<()> {
    let threshold = config.frequency_threshold;
    let report = SavingsEngine::with_config(db, config).frequency(user_id, against)?;

    if json {
        return print_json(&report);
    }
    print_frequency(&report, threshold);
    Ok(())
}

fn print_frequency(report: &FrequencyReport, threshold: i64) {
    println!();
    println!("🔁 Savings on Frequent Purchases");
    println!("   ─────────────────────────────────────────────────────────────");

    if report.items.is_empty() {
        println!(
            "   No item bought {} or more times has a cheaper price.",
            threshold
        );
        return;
    }

    println!(
        "   {:24} │ {:>5} │ {:>8} │ {:>8} │ {:>9} │ {:>9}",
        "Item", "Qty", "Avg", "Best", "Monthly", "Annual"
    );
    println!("   ─────────────────────────┼───────┼──────────┼──────────┼───────────┼──────────");

    for item in &report.items {
        println!(
            "   {:24} │ {:>5} │ {:>8.2} │ {:>8.2} │ {:>9.2} │ {:>9.2}",
            truncate(&item.item_name, 24),
            item.frequency,
            item.average_price,
            item.cheapest_price,
            item.monthly_savings,
            item.annual_savings
        );
    }

    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   💰 About {:.2} a month, {:.2} a year",
        report.total_monthly_savings, report.total_annual_savings
    );
}

pub fn cmd_history(
    db: &Database,
    config: EngineConfig,
    user_id: i64,
    against: i64,
    json: bool,
) -> Result<()> {
    let history = SavingsEngine::with_config(db, config).history(user_id, against)?;

    if json {
        return print_json(&history);
    }
    print_history(&history);
    Ok(())
}

fn print_history(history: &SavingsHistory) {
    println!();
    println!(
        "📅 Monthly Savings (user #{} vs #{})",
        history.subject_user_id, history.comparison_user_id
    );
    println!("   ─────────────────────────────────────────────────────────────");

    if history.months.is_empty() {
        println!("   No purchases recorded.");
        return;
    }

    for month in &history.months {
        println!(
            "   {:16} │ {:>10.2} │ {:>3} transactions",
            month.month_label, month.savings, month.transaction_count
        );
    }

    println!("   ─────────────────────────────────────────────────────────────");
    println!("   💰 Total: {:.2}", history.total_savings);
}

pub fn cmd_project(
    db: &Database,
    config: EngineConfig,
    user_id: i64,
    against: i64,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let result = SavingsEngine::with_config(db, config).projection_at(user_id, against, today)?;

    if json {
        return print_json(&result);
    }
    print_projection(&result, today);
    Ok(())
}

fn print_projection(result: &SavingsProjection, today: NaiveDate) {
    let projection = &result.projection;

    println!();
    println!(
        "📈 Invested Savings as of {} ({:.1}% a year)",
        today.format("%Y-%m-%d"),
        projection.annual_rate * 100.0
    );
    println!("   ─────────────────────────────────────────────────────────────");

    if projection.months.is_empty() {
        println!("   No savings to invest yet.");
        return;
    }

    println!(
        "   {:16} │ {:>10} │ {:>6} │ {:>10} │ {:>9}",
        "Month", "Saved", "Months", "Worth now", "Earned"
    );
    println!("   ─────────────────┼────────────┼────────┼────────────┼──────────");

    for month in &projection.months {
        println!(
            "   {:16} │ {:>10.2} │ {:>6} │ {:>10.2} │ {:>9.2}",
            month.month_label,
            month.principal,
            month.months_elapsed,
            month.future_value,
            month.earnings
        );
    }

    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Saved:     {:.2}", projection.total_principal);
    println!("   Worth now: {:.2}", projection.total_future_value);
    println!(
        "   💰 Earned:  {:.2} ({:.2}%)",
        projection.total_earnings, projection.return_percent
    );
}
