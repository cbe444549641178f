//! Transaction file import
//!
//! Two layouts are accepted:
//! - JSON: an array of `{merchant, location?, timestamp|date, items: [...]}`
//! - CSV: one line item per row with headers
//!   `date,merchant,location,item,quantity,unit_price,total_price`.
//!   Consecutive rows sharing date, merchant and location form one transaction.
//!
//! Every transaction gets an import hash so importing a file twice is a no-op.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{NewLineItem, NewTransaction, TransactionSource};

/// Supported import file layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Json,
    Csv,
}

impl ImportFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

impl FromStr for ImportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(format!("Unknown import format: {} (expected json or csv)", s)),
        }
    }
}

/// Outcome of importing one file
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub parsed: usize,
    pub imported: usize,
    pub skipped: usize,
}

/// Parse a timestamp or a bare date (taken as midnight UTC)
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.and_utc());
        }
    }

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
        "%m/%d/%y", // 01/15/24
    ];
    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return Ok(dt.and_utc());
            }
        }
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse an amount string, handling currency symbols and commas
fn parse_amount(s: &str) -> Result<f64> {
    let cleaned = s.trim().replace(['$', ',', ' '], "");
    cleaned
        .parse::<f64>()
        .map_err(|_| Error::Import(format!("Unable to parse amount: {}", s)))
}

/// Deduplication hash over the owner and everything that identifies a purchase
pub fn generate_hash(user_id: i64, tx: &NewTransaction) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_id.to_be_bytes());
    hasher.update(tx.merchant.trim().as_bytes());
    hasher.update([0u8]);
    hasher.update(tx.location.as_deref().unwrap_or("").trim().as_bytes());
    hasher.update([0u8]);
    hasher.update(tx.timestamp.timestamp().to_be_bytes());
    for item in &tx.items {
        hasher.update(item.name.trim().as_bytes());
        hasher.update([0u8]);
        hasher.update(item.quantity.to_be_bytes());
        hasher.update(item.unit_price.to_be_bytes());
        hasher.update(item.resolved_total().to_be_bytes());
    }
    hex::encode(hasher.finalize())
}

#[derive(Debug, Deserialize)]
struct JsonTransaction {
    merchant: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    items: Vec<NewLineItem>,
}

/// Parse the JSON layout
pub fn parse_json<R: Read>(reader: R, source: TransactionSource) -> Result<Vec<NewTransaction>> {
    let raw: Vec<JsonTransaction> = serde_json::from_reader(reader)?;
    let mut transactions = Vec::with_capacity(raw.len());

    for (idx, record) in raw.into_iter().enumerate() {
        if record.items.is_empty() {
            warn!(index = idx, merchant = %record.merchant, "Skipping transaction without items");
            continue;
        }
        let when = record
            .timestamp
            .or(record.date)
            .ok_or_else(|| Error::Import(format!("Transaction {} has no timestamp or date", idx)))?;

        transactions.push(NewTransaction {
            merchant: record.merchant,
            location: record.location.filter(|l| !l.trim().is_empty()),
            timestamp: parse_timestamp(&when)?,
            source,
            import_hash: None,
            items: record.items,
        });
    }

    Ok(transactions)
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    merchant: String,
    #[serde(default)]
    location: Option<String>,
    item: String,
    #[serde(default)]
    quantity: Option<String>,
    unit_price: String,
    #[serde(default)]
    total_price: Option<String>,
}

/// Parse the CSV layout
pub fn parse_csv<R: Read>(reader: R, source: TransactionSource) -> Result<Vec<NewTransaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut transactions: Vec<NewTransaction> = Vec::new();
    let mut current_key: Option<(String, String, String)> = None;

    for (idx, result) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        // Header is line 1
        let line = idx + 2;

        if row.item.is_empty() {
            warn!(line, "Skipping row without an item name");
            continue;
        }

        let quantity = match row.quantity.as_deref().filter(|q| !q.is_empty()) {
            Some(q) => q
                .parse::<i64>()
                .map_err(|_| Error::Import(format!("Line {}: invalid quantity '{}'", line, q)))?,
            None => 1,
        };
        let mut item = NewLineItem::new(row.item, quantity, parse_amount(&row.unit_price)?);
        if let Some(total) = row.total_price.as_deref().filter(|t| !t.is_empty()) {
            item = item.with_total(parse_amount(total)?);
        }

        let location = row.location.unwrap_or_default();
        let key = (row.date.clone(), row.merchant.clone(), location.clone());
        let continues = current_key.as_ref() == Some(&key);

        match transactions.last_mut() {
            Some(tx) if continues => tx.items.push(item),
            _ => {
                transactions.push(NewTransaction {
                    merchant: row.merchant,
                    location: Some(location).filter(|l| !l.is_empty()),
                    timestamp: parse_timestamp(&row.date)?,
                    source,
                    import_hash: None,
                    items: vec![item],
                });
                current_key = Some(key);
            }
        }
    }

    Ok(transactions)
}

/// Parse a file, detecting the format from its extension when not given
pub fn parse_file(
    path: &Path,
    format: Option<ImportFormat>,
    source: TransactionSource,
) -> Result<Vec<NewTransaction>> {
    let format = format
        .or_else(|| ImportFormat::from_path(path))
        .ok_or_else(|| {
            Error::Import(format!(
                "Cannot detect format of {}; pass --format json or csv",
                path.display()
            ))
        })?;

    let reader = BufReader::new(File::open(path)?);
    let transactions = match format {
        ImportFormat::Json => parse_json(reader, source)?,
        ImportFormat::Csv => parse_csv(reader, source)?,
    };
    debug!(path = %path.display(), count = transactions.len(), ?format, "Parsed import file");
    Ok(transactions)
}

/// Store parsed transactions for a user, skipping ones seen before
pub fn import_transactions(
    db: &Database,
    user_id: i64,
    transactions: Vec<NewTransaction>,
) -> Result<ImportSummary> {
    db.require_user(user_id)?;

    // Nothing is stored unless every transaction in the batch is valid
    for (idx, tx) in transactions.iter().enumerate() {
        tx.validate().map_err(|e| {
            Error::InvalidInput(format!(
                "Transaction {} ({} on {}): {}",
                idx + 1,
                tx.merchant,
                tx.timestamp.format("%Y-%m-%d"),
                e
            ))
        })?;
    }

    let mut summary = ImportSummary {
        parsed: transactions.len(),
        ..Default::default()
    };
    for mut tx in transactions {
        if tx.import_hash.is_none() {
            tx.import_hash = Some(generate_hash(user_id, &tx));
        }
        if db.insert_transaction(user_id, &tx)?.is_inserted() {
            summary.imported += 1;
        } else {
            summary.skipped += 1;
        }
    }

    info!(
        user_id,
        imported = summary.imported,
        skipped = summary.skipped,
        "Imported transactions"
    );
    Ok(summary)
}

/// Parse and import a file in one step
pub fn import_file(
    db: &Database,
    user_id: i64,
    path: &Path,
    format: Option<ImportFormat>,
    source: TransactionSource,
) -> Result<ImportSummary> {
    let transactions = parse_file(path, format, source)?;
    import_transactions(db, user_id, transactions)
}
