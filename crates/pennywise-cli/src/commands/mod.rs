//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init, seed) and shared utilities (open_db, load_config)
//! - `import` - File import command
//! - `reports` - Report generation commands
//! - `savings` - Comparison, frequency, history and projection commands
//! - `serve` - Web server command
//! - `status` - Status command
//! - `transactions` - Transaction commands (list, reset)
//! - `users` - User commands (list, add)

pub mod core;
pub mod import;
pub mod reports;
pub mod savings;
pub mod serve;
pub mod status;
pub mod transactions;
pub mod users;

// Re-export command functions for main.rs
pub use core::*;
pub use import::*;
pub use reports::*;
pub use savings::*;
pub use serve::*;
pub use status::*;
pub use transactions::*;
pub use users::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
