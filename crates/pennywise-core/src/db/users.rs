//! User operations

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::User;

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let created_at: String = row.get(3)?;
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        balance: row.get(2)?,
        created_at: parse_datetime(&created_at),
    })
}

impl Database {
    /// Create a user, or return the existing one with the same name
    pub fn upsert_user(&self, name: &str, balance: f64) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("User name cannot be empty".to_string()));
        }
        if !balance.is_finite() {
            return Err(Error::InvalidInput("Balance must be a finite number".to_string()));
        }

        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM users WHERE name = ?",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        conn.execute(
            "INSERT INTO users (name, balance) VALUES (?, ?)",
            params![name, balance],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List all users
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, name, balance, created_at FROM users ORDER BY id")?;

        let users = stmt
            .query_map([], row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Get a user by ID
    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, name, balance, created_at FROM users WHERE id = ?",
                params![id],
                row_to_user,
            )
            .optional()?;

        Ok(user)
    }

    /// Get a user by name (surrounding whitespace ignored)
    pub fn get_user_by_name(&self, name: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, name, balance, created_at FROM users WHERE name = ?",
                params![name.trim()],
                row_to_user,
            )
            .optional()?;

        Ok(user)
    }

    /// Get a user by ID, failing with `NotFound` when absent
    pub fn require_user(&self, id: i64) -> Result<User> {
        self.get_user(id)?
            .ok_or_else(|| Error::NotFound(format!("User {} not found", id)))
    }

    /// Delete a user; their transactions and line items cascade
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM users WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }
}
