//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use chrono::{NaiveDate, TimeZone, Utc};
use pennywise_core::models::{NewLineItem, NewTransaction, TransactionSource};
use pennywise_core::{Database, EngineConfig};

use crate::commands::{self, truncate, CompareInput};

fn setup_test_db() -> Database {
    Database::in_memory().unwrap()
}

/// Two users with overlapping purchases, returning (subject_id, comparison_id)
fn setup_pair(db: &Database) -> (i64, i64) {
    let alex = db.upsert_user("Alex", 100.0).unwrap();
    let sam = db.upsert_user("Sam", 200.0).unwrap();

    insert(
        db,
        alex,
        "Corner Market",
        (2024, 3, 10),
        TransactionSource::Manual,
        vec![NewLineItem::new("Coffee", 3, 5.00), NewLineItem::new("Milk", 1, 4.00)],
    );
    insert(
        db,
        sam,
        "Fresh Foods",
        (2024, 2, 1),
        TransactionSource::Sync,
        vec![NewLineItem::new("Coffee", 1, 4.00), NewLineItem::new("Milk", 1, 3.00)],
    );

    (alex, sam)
}

fn insert(
    db: &Database,
    user_id: i64,
    merchant: &str,
    (y, m, d): (i32, u32, u32),
    source: TransactionSource,
    items: Vec<NewLineItem>,
) -> i64 {
    let tx = NewTransaction {
        merchant: merchant.to_string(),
        location: None,
        timestamp: Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
        source,
        import_hash: None,
        items,
    };
    db.insert_transaction(user_id, &tx).unwrap().id()
}

// ========== Core Command Tests ==========

#[test]
fn test_cmd_init_creates_database() {
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test.db");

    let result = commands::cmd_init(&db_path, true);
    assert!(result.is_ok());
    assert!(db_path.exists());

    let db = commands::open_db(&db_path, true).unwrap();
    assert_eq!(db.get_store_stats().unwrap().users, 0);
}

#[test]
fn test_cmd_seed_is_idempotent() {
    let db = setup_test_db();

    commands::cmd_seed(&db).unwrap();
    let first = db.get_store_stats().unwrap();
    commands::cmd_seed(&db).unwrap();
    let second = db.get_store_stats().unwrap();

    assert_eq!(first.users, 2);
    assert_eq!(first.transactions, second.transactions);
}

#[test]
fn test_parse_as_of() {
    let date = commands::parse_as_of(Some("2025-03-01")).unwrap();
    assert_eq!(date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());

    assert!(commands::parse_as_of(Some("03/01/2025")).is_err());
    assert!(commands::parse_as_of(None).is_ok());
}

#[test]
fn test_load_config_from_file() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[savings]\nannual_return_rate = 0.05\ncomparison_source = \"all\"\nfrequency_threshold = 2"
    )
    .unwrap();

    let config = commands::load_config(Some(file.path())).unwrap();
    assert_eq!(config.annual_return_rate, 0.05);
    assert_eq!(config.comparison_source, None);
    assert_eq!(config.frequency_threshold, 2);
}

#[test]
fn test_load_config_rejects_bad_values() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[savings]\nfrequency_threshold = 0").unwrap();

    assert!(commands::load_config(Some(file.path())).is_err());
}

// ========== Users Command Tests ==========

#[test]
fn test_cmd_users_add_and_list() {
    let db = setup_test_db();

    commands::cmd_users_add(&db, "Alex", 25.0).unwrap();
    commands::cmd_users_add(&db, "Alex", 99.0).unwrap();

    let users = db.list_users().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].balance, 25.0);
    assert!(commands::cmd_users_list(&db).is_ok());
}

#[test]
fn test_cmd_users_add_blank_name() {
    let db = setup_test_db();
    assert!(commands::cmd_users_add(&db, "   ", 0.0).is_err());
}

#[test]
fn test_cmd_users_list_empty() {
    let db = setup_test_db();
    assert!(commands::cmd_users_list(&db).is_ok());
}

// ========== Import Command Tests ==========

#[test]
fn test_cmd_import_csv_twice() {
    use tempfile::tempdir;

    let db = setup_test_db();
    let sam = db.upsert_user("Sam", 0.0).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("sam.csv");
    std::fs::write(
        &path,
        "date,merchant,location,item,quantity,unit_price,total_price\n\
         2024-01-15,Fresh Foods,Eastside,Milk,2,3.19,\n\
         2024-01-15,Fresh Foods,Eastside,Bread,1,3.99,\n",
    )
    .unwrap();

    commands::cmd_import(&db, &path, sam, "sync", None).unwrap();
    commands::cmd_import(&db, &path, sam, "sync", None).unwrap();

    let txs = db.list_user_transactions(sam, None).unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].items.len(), 2);
    assert_eq!(txs[0].source, TransactionSource::Sync);
}

#[test]
fn test_cmd_import_json_with_explicit_format() {
    use tempfile::tempdir;

    let db = setup_test_db();
    let alex = db.upsert_user("Alex", 0.0).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("receipts.txt");
    std::fs::write(
        &path,
        r#"[{"merchant": "QuickStop", "date": "2024-02-02",
             "items": [{"name": "Coffee Beans", "unit_price": 14.99}]}]"#,
    )
    .unwrap();

    // Extension gives no hint
    assert!(commands::cmd_import(&db, &path, alex, "receipt", None).is_err());

    commands::cmd_import(&db, &path, alex, "receipt", Some("json")).unwrap();
    let txs = db.list_user_transactions(alex, None).unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].source, TransactionSource::Receipt);
}

#[test]
fn test_cmd_import_rejects_bad_arguments() {
    let db = setup_test_db();
    let alex = db.upsert_user("Alex", 0.0).unwrap();
    let path = std::path::Path::new("missing.csv");

    assert!(commands::cmd_import(&db, path, alex, "carrier-pigeon", None).is_err());
    assert!(commands::cmd_import(&db, path, alex, "sync", Some("xml")).is_err());

    let result = commands::cmd_import(&db, path, 999, "sync", None);
    assert!(result.unwrap_err().to_string().contains("not found"));
}

// ========== Transactions Command Tests ==========

#[test]
fn test_cmd_transactions_list() {
    let db = setup_test_db();
    let (alex, _) = setup_pair(&db);

    assert!(commands::cmd_transactions_list(&db, alex, None, 20).is_ok());
    assert!(commands::cmd_transactions_list(&db, alex, Some("all"), 20).is_ok());
    assert!(commands::cmd_transactions_list(&db, alex, Some("manual"), 0).is_ok());
    assert!(commands::cmd_transactions_list(&db, alex, Some("bogus"), 20).is_err());
    assert!(commands::cmd_transactions_list(&db, 999, None, 20).is_err());
}

#[test]
fn test_cmd_reset_by_source() {
    let db = setup_test_db();
    let (alex, sam) = setup_pair(&db);

    commands::cmd_reset(&db, "sync", Some(alex), true).unwrap();
    assert_eq!(db.list_user_transactions(sam, None).unwrap().len(), 1);

    commands::cmd_reset(&db, "sync", None, true).unwrap();
    assert!(db.list_user_transactions(sam, None).unwrap().is_empty());
    assert_eq!(db.list_user_transactions(alex, None).unwrap().len(), 1);
}

#[test]
fn test_cmd_reset_rejects_unknown_source() {
    let db = setup_test_db();
    let result = commands::cmd_reset(&db, "all", None, true);
    assert!(result.is_err());
}

// ========== Savings Command Tests ==========

#[test]
fn test_cmd_compare_from_file() {
    use tempfile::tempdir;

    let db = setup_test_db();
    let (_, sam) = setup_pair(&db);

    let dir = tempdir().unwrap();
    let path = dir.path().join("items.json");
    std::fs::write(
        &path,
        r#"[{"name": "milk", "quantity": 2, "unit_price": 4.00}, {"name": "caviar", "unit_price": 80}]"#,
    )
    .unwrap();

    let items = commands::read_items_file(&path).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].quantity, 1);

    let config = EngineConfig::default();
    assert!(commands::cmd_compare(&db, config.clone(), sam, CompareInput::File(path), false).is_ok());

    let empty = dir.path().join("empty.json");
    std::fs::write(&empty, "[]").unwrap();
    assert!(commands::cmd_compare(&db, config, sam, CompareInput::File(empty), true).is_err());
}

#[test]
fn test_cmd_compare_stored_transaction() {
    let db = setup_test_db();
    let (alex, sam) = setup_pair(&db);
    let tx_id = db.list_user_transactions(alex, None).unwrap()[0].id;

    let config = EngineConfig::default();
    assert!(commands::cmd_compare(
        &db,
        config.clone(),
        sam,
        CompareInput::Transaction(tx_id),
        true
    )
    .is_ok());

    let result = commands::cmd_compare(&db, config, sam, CompareInput::Transaction(9999), false);
    assert!(result.unwrap_err().to_string().contains("not found"));
}

#[test]
fn test_cmd_compare_own_transaction_rejected() {
    let db = setup_test_db();
    let (_, sam) = setup_pair(&db);
    let own = insert(
        &db,
        sam,
        "Fresh Foods",
        (2024, 4, 1),
        TransactionSource::Sync,
        vec![NewLineItem::new("Milk", 1, 4.50)],
    );

    let err = commands::cmd_compare(
        &db,
        EngineConfig::default(),
        sam,
        CompareInput::Transaction(own),
        true,
    )
    .unwrap_err();
    let core = err.downcast_ref::<pennywise_core::Error>().unwrap();
    assert_eq!(core.kind(), "invalid_input");
}

#[test]
fn test_cmd_savings_reports() {
    let db = setup_test_db();
    let (alex, sam) = setup_pair(&db);
    let config = EngineConfig::default();
    let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

    assert!(commands::cmd_frequency(&db, config.clone(), alex, sam, false).is_ok());
    assert!(commands::cmd_history(&db, config.clone(), alex, sam, false).is_ok());
    assert!(commands::cmd_history(&db, config.clone(), alex, sam, true).is_ok());
    assert!(commands::cmd_project(&db, config, alex, sam, today, false).is_ok());
}

#[test]
fn test_cmd_savings_rejects_bad_pairs() {
    let db = setup_test_db();
    let (alex, _) = setup_pair(&db);
    let config = EngineConfig::default();

    assert!(commands::cmd_history(&db, config.clone(), alex, alex, false).is_err());
    assert!(commands::cmd_frequency(&db, config, alex, 999, false).is_err());
}

// ========== Report Command Tests ==========

#[test]
fn test_cmd_report_merchants() {
    let db = setup_test_db();
    let (alex, _) = setup_pair(&db);

    assert!(commands::cmd_report_merchants(&db, alex, 10).is_ok());
    assert!(commands::cmd_report_merchants(&db, 999, 10).is_err());
}

#[test]
fn test_cmd_status_missing_database() {
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let result = commands::cmd_status(&dir.path().join("nope.db"), true);
    assert!(result.is_ok());
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("Milk", 10), "Milk");
    assert_eq!(truncate("Sourdough Bread Loaf", 10), "Sourdou...");
    assert_eq!(truncate("Crème brûlée", 8), "Crème...");
}
