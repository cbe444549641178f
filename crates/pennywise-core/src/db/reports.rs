//! Spending breakdowns and store statistics

use rusqlite::params;

use super::Database;
use crate::error::Result;
use crate::models::{MerchantSummary, MerchantsReport, SourceCount, StoreStats, TransactionSource};

impl Database {
    /// Top merchants by spending for one user
    ///
    /// Spend is the sum of line totals; transactions without items count
    /// toward `transaction_count` but add nothing to the amount.
    pub fn get_top_merchants(&self, user_id: i64, limit: i64) -> Result<MerchantsReport> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT
                t.merchant,
                COALESCE(SUM(li.total_price), 0) AS amount,
                COUNT(DISTINCT t.id) AS tx_count,
                COALESCE(SUM(li.quantity), 0) AS item_count
            FROM transactions t
            LEFT JOIN line_items li ON li.transaction_id = t.id
            WHERE t.user_id = ?
            GROUP BY t.merchant
            ORDER BY amount DESC, t.merchant ASC
            LIMIT ?
            "#,
        )?;

        let merchants = stmt
            .query_map(params![user_id, limit], |row| {
                Ok(MerchantSummary {
                    merchant: row.get(0)?,
                    amount: row.get(1)?,
                    transaction_count: row.get(2)?,
                    item_count: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let total: f64 = conn.query_row(
            r#"
            SELECT COALESCE(SUM(li.total_price), 0)
            FROM line_items li JOIN transactions t ON t.id = li.transaction_id
            WHERE t.user_id = ?
            "#,
            params![user_id],
            |row| row.get(0),
        )?;

        Ok(MerchantsReport {
            user_id,
            limit,
            total,
            merchants,
        })
    }

    /// Row counts across the store, broken down by provenance tag
    pub fn get_store_stats(&self) -> Result<StoreStats> {
        let conn = self.conn()?;

        let users: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        let transactions: i64 =
            conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        let line_items: i64 =
            conn.query_row("SELECT COUNT(*) FROM line_items", [], |row| row.get(0))?;

        let mut by_source = Vec::with_capacity(TransactionSource::ALL.len());
        for source in TransactionSource::ALL {
            let (tx_count, item_count): (i64, i64) = conn.query_row(
                r#"
                SELECT
                    COUNT(DISTINCT t.id),
                    COUNT(li.id)
                FROM transactions t
                LEFT JOIN line_items li ON li.transaction_id = t.id
                WHERE t.source = ?
                "#,
                params![source.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            by_source.push(SourceCount {
                source,
                transactions: tx_count,
                line_items: item_count,
            });
        }

        Ok(StoreStats {
            users,
            transactions,
            line_items,
            by_source,
        })
    }
}
