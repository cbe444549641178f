//! Transaction and line item operations

use std::collections::HashMap;

use chrono::SecondsFormat;
use rusqlite::{params, OptionalExtension, Row, ToSql};
use tracing::{debug, info};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{LineItem, NewTransaction, Transaction, TransactionSource};

/// Result of inserting a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionInsertResult {
    /// Transaction was inserted, contains the new transaction ID
    Inserted(i64),
    /// A transaction with the same import hash exists, contains its ID
    Duplicate(i64),
}

impl TransactionInsertResult {
    pub fn id(&self) -> i64 {
        match self {
            Self::Inserted(id) | Self::Duplicate(id) => *id,
        }
    }

    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}

/// Reject transactions the store must never hold
fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let timestamp: String = row.get(4)?;
    let source: String = row.get(5)?;
    let created_at: String = row.get(7)?;
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        merchant: row.get(2)?,
        location: row.get(3)?,
        timestamp: parse_datetime(&timestamp),
        source: source.parse().unwrap_or_default(),
        import_hash: row.get(6)?,
        items: Vec::new(),
        created_at: parse_datetime(&created_at),
    })
}

fn row_to_line_item(row: &Row<'_>) -> rusqlite::Result<LineItem> {
    Ok(LineItem {
        id: row.get(0)?,
        transaction_id: row.get(1)?,
        name: row.get(2)?,
        quantity: row.get(3)?,
        unit_price: row.get(4)?,
        total_price: row.get(5)?,
    })
}

const TRANSACTION_COLUMNS: &str =
    "t.id, t.user_id, t.merchant, t.location, t.timestamp, t.source, t.import_hash, t.created_at";

impl Database {
    /// Insert a transaction and its line items atomically
    ///
    /// Transactions carrying an `import_hash` that already exists are skipped.
    pub fn insert_transaction(
        &self,
        user_id: i64,
        tx: &NewTransaction,
    ) -> Result<TransactionInsertResult> {
        tx.validate()?;

        let mut conn = self.conn()?;
        let db_tx = conn.transaction()?;

        if let Some(hash) = &tx.import_hash {
            let existing: Option<i64> = db_tx
                .query_row(
                    "SELECT id FROM transactions WHERE import_hash = ?",
                    params![hash],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(existing_id) = existing {
                debug!(existing_id, "Skipping duplicate transaction");
                return Ok(TransactionInsertResult::Duplicate(existing_id));
            }
        }

        let user_exists: Option<i64> = db_tx
            .query_row(
                "SELECT id FROM users WHERE id = ?",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        if user_exists.is_none() {
            return Err(Error::NotFound(format!("User {} not found", user_id)));
        }

        db_tx.execute(
            r#"
            INSERT INTO transactions (user_id, merchant, location, timestamp, source, import_hash)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                tx.merchant.trim(),
                tx.location.as_deref().map(str::trim).filter(|l| !l.is_empty()),
                tx.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
                tx.source.as_str(),
                tx.import_hash,
            ],
        )?;
        let transaction_id = db_tx.last_insert_rowid();

        {
            let mut stmt = db_tx.prepare(
                "INSERT INTO line_items (transaction_id, name, quantity, unit_price, total_price) VALUES (?, ?, ?, ?, ?)",
            )?;
            for item in &tx.items {
                stmt.execute(params![
                    transaction_id,
                    item.name.trim(),
                    item.quantity,
                    item.unit_price,
                    item.resolved_total(),
                ])?;
            }
        }

        db_tx.commit()?;
        Ok(TransactionInsertResult::Inserted(transaction_id))
    }

    /// Load a user's full history, oldest first, with line items
    ///
    /// Order is timestamp then id; items follow insertion order. The savings
    /// engine relies on this order for its tie-breaking.
    pub fn list_user_transactions(
        &self,
        user_id: i64,
        source: Option<TransactionSource>,
    ) -> Result<Vec<Transaction>> {
        self.query_user_transactions(user_id, source, "ASC", None)
    }

    /// Most recent transactions for a user, newest first
    pub fn recent_user_transactions(
        &self,
        user_id: i64,
        source: Option<TransactionSource>,
        limit: i64,
    ) -> Result<Vec<Transaction>> {
        self.query_user_transactions(user_id, source, "DESC", Some(limit))
    }

    fn query_user_transactions(
        &self,
        user_id: i64,
        source: Option<TransactionSource>,
        direction: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let mut conditions = vec!["t.user_id = ?"];
        let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(user_id)];
        if let Some(src) = source {
            conditions.push("t.source = ?");
            params.push(Box::new(src.as_str()));
        }
        let where_clause = conditions.join(" AND ");

        let mut sql = format!(
            "SELECT {} FROM transactions t WHERE {} ORDER BY t.timestamp {dir}, t.id {dir}",
            TRANSACTION_COLUMNS,
            where_clause,
            dir = direction
        );
        if let Some(limit) = limit {
            sql.push_str(" LIMIT ?");
            params.push(Box::new(limit));
        }

        let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let mut transactions = stmt
            .query_map(param_refs.as_slice(), row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        // Items for the same filter in one pass, grouped by transaction
        let item_sql = format!(
            "SELECT li.id, li.transaction_id, li.name, li.quantity, li.unit_price, li.total_price \
             FROM line_items li JOIN transactions t ON t.id = li.transaction_id \
             WHERE {} ORDER BY li.id",
            where_clause
        );
        let item_params = &param_refs[..if source.is_some() { 2 } else { 1 }];
        let mut item_stmt = conn.prepare(&item_sql)?;
        let mut items_by_tx: HashMap<i64, Vec<LineItem>> = HashMap::new();
        for item in item_stmt.query_map(item_params, row_to_line_item)? {
            let item = item?;
            items_by_tx.entry(item.transaction_id).or_default().push(item);
        }

        for tx in &mut transactions {
            tx.items = items_by_tx.remove(&tx.id).unwrap_or_default();
        }

        Ok(transactions)
    }

    /// Get one transaction with its line items
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM transactions t WHERE t.id = ?",
            TRANSACTION_COLUMNS
        );
        let tx = conn
            .query_row(&sql, params![id], row_to_transaction)
            .optional()?;

        let Some(mut tx) = tx else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT id, transaction_id, name, quantity, unit_price, total_price FROM line_items WHERE transaction_id = ? ORDER BY id",
        )?;
        tx.items = stmt
            .query_map(params![id], row_to_line_item)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Some(tx))
    }

    /// Bulk delete transactions by provenance tag, optionally for one user
    ///
    /// Line items go with them through the cascade. Returns the number of
    /// transactions removed.
    pub fn delete_transactions_by_source(
        &self,
        source: TransactionSource,
        user_id: Option<i64>,
    ) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = match user_id {
            Some(uid) => conn.execute(
                "DELETE FROM transactions WHERE source = ? AND user_id = ?",
                params![source.as_str(), uid],
            )?,
            None => conn.execute(
                "DELETE FROM transactions WHERE source = ?",
                params![source.as_str()],
            )?,
        };

        info!(source = %source, ?user_id, deleted, "Deleted transactions by source");
        Ok(deleted)
    }
}
