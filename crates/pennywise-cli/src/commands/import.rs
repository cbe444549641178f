//! Import command implementation

use std::path::Path;

use anyhow::{Context, Result};
use pennywise_core::models::TransactionSource;
use pennywise_core::{import, Database, ImportFormat};

pub fn cmd_import(
    db: &Database,
    file: &Path,
    user_id: i64,
    source: &str,
    format: Option<&str>,
) -> Result<()> {
    let source: TransactionSource = source.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let format: Option<ImportFormat> = format
        .map(str::parse::<ImportFormat>)
        .transpose()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let user = db.require_user(user_id)?;
    println!(
        "📥 Importing {} for {} (#{}) as {}...",
        file.display(),
        user.name,
        user.id,
        source
    );

    let summary = import::import_file(db, user_id, file, format, source)
        .with_context(|| format!("Failed to import {}", file.display()))?;

    println!("   Parsed:   {}", summary.parsed);
    println!("   Imported: {}", summary.imported);
    if summary.skipped > 0 {
        println!("   Skipped:  {} (already imported)", summary.skipped);
    }
    println!("✅ Import complete");

    Ok(())
}
