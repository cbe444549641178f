//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod health;
pub mod reports;
pub mod savings;
pub mod transactions;
pub mod users;

// Re-export all handlers for use in router
pub use health::*;
pub use reports::*;
pub use savings::*;
pub use transactions::*;
pub use users::*;
