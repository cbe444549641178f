//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use pennywise_core::db::Database;
use pennywise_core::models::{NewLineItem, NewTransaction, TransactionSource};
use tower::ServiceExt;

fn test_config() -> ServerConfig {
    ServerConfig {
        require_auth: false,
        allowed_origins: vec![],
        ..Default::default()
    }
}

fn setup_test_app() -> Router {
    let db = Database::in_memory().unwrap();
    create_router(db, test_config())
}

/// Alex (subject) and Sam (comparison, synced prices)
fn setup_seeded_app() -> (Router, i64, i64) {
    let db = Database::in_memory().unwrap();
    let alex = db.upsert_user("Alex", 100.0).unwrap();
    let sam = db.upsert_user("Sam", 200.0).unwrap();

    let sync = NewTransaction {
        merchant: "Fresh Foods".to_string(),
        location: Some("Eastside".to_string()),
        timestamp: Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap(),
        source: TransactionSource::Sync,
        import_hash: None,
        items: vec![
            NewLineItem::new("Milk", 1, 3.00),
            NewLineItem::new("Coffee", 1, 4.00),
        ],
    };
    db.insert_transaction(sam, &sync).unwrap();

    for (month, price) in [(2, 5.50), (3, 4.50)] {
        let tx = NewTransaction {
            merchant: "Corner Market".to_string(),
            location: None,
            timestamp: Utc.with_ymd_and_hms(2024, month, 10, 12, 0, 0).unwrap(),
            source: TransactionSource::Manual,
            import_hash: None,
            items: vec![
                NewLineItem::new("Coffee", 2, price),
                NewLineItem::new("Whole Milk", 1, 4.00),
            ],
        };
        db.insert_transaction(alex, &tx).unwrap();
    }

    (create_router(db, test_config()), alex, sam)
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ========== Health & Auth ==========

#[tokio::test]
async fn test_health() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_security_headers() {
    let app = setup_test_app();

    let response = app.oneshot(get("/api/health")).await.unwrap();
    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
}

#[tokio::test]
async fn test_auth_required_by_default() {
    let db = Database::in_memory().unwrap();
    let config = ServerConfig {
        api_keys: vec!["secret-key".to_string()],
        ..Default::default()
    };
    let app = create_router(db, config);

    // Health stays public
    let response = app.clone().oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/api/users")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/users")
                .header("authorization", "Bearer wrong-key!")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/users")
                .header("authorization", "Bearer secret-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[test]
fn test_validate_api_key() {
    let keys = vec!["abc".to_string(), "longer-key".to_string()];
    assert!(validate_api_key("abc", &keys));
    assert!(validate_api_key("longer-key", &keys));
    assert!(!validate_api_key("abd", &keys));
    assert!(!validate_api_key("", &keys));
    assert!(!validate_api_key("abc", &[]));
}

#[test]
fn test_parse_api_keys() {
    assert_eq!(parse_api_keys(" a, b ,,c "), vec!["a", "b", "c"]);
    assert!(parse_api_keys("").is_empty());
}

// ========== Users ==========

#[tokio::test]
async fn test_create_and_get_user() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/users",
            serde_json::json!({"name": "Alex", "balance": 12.5}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let user = get_body_json(response).await;
    assert_eq!(user["name"], "Alex");
    let id = user["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(get(&format!("/api/users/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["balance"], 12.5);

    let response = app.clone().oneshot(get("/api/users")).await.unwrap();
    assert_eq!(get_body_json(response).await.as_array().unwrap().len(), 1);

    let response = app.oneshot(get("/api/users/999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(get_body_json(response).await["kind"], "not_found");
}

#[tokio::test]
async fn test_create_existing_user_keeps_balance() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/users",
            serde_json::json!({"name": "Alex", "balance": 12.5}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = get_body_json(response).await["id"].as_i64().unwrap();

    let response = app
        .oneshot(post_json(
            "/api/users",
            serde_json::json!({"name": " Alex ", "balance": 500.0}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let user = get_body_json(response).await;
    assert_eq!(user["id"], id);
    assert_eq!(user["balance"], 12.5);
}

#[tokio::test]
async fn test_create_user_rejects_blank_name() {
    let app = setup_test_app();

    let response = app
        .oneshot(post_json("/api/users", serde_json::json!({"name": "  "})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(get_body_json(response).await["kind"], "invalid_input");
}

// ========== Transactions ==========

#[tokio::test]
async fn test_create_and_list_transactions() {
    let (app, alex, _) = setup_seeded_app();

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/users/{}/transactions", alex),
            serde_json::json!({
                "merchant": "QuickStop",
                "timestamp": "2024-04-01T09:00:00Z",
                "items": [{"name": "Bananas", "quantity": 6, "unit_price": 0.45}]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let tx = get_body_json(response).await;
    assert_eq!(tx["source"], "manual");
    assert_eq!(tx["items"][0]["quantity"], 6);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/users/{}/transactions?limit=2", alex)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let txs = json["transactions"].as_array().unwrap();
    assert_eq!(txs.len(), 2);
    // Newest first
    assert_eq!(txs[0]["merchant"], "QuickStop");

    let response = app
        .oneshot(get(&format!("/api/users/{}/transactions?source=sync", alex)))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert!(json["transactions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_transaction_validation() {
    let (app, alex, _) = setup_seeded_app();

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/users/{}/transactions", alex),
            serde_json::json!({"merchant": "Shop", "items": []}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/users/{}/transactions", alex),
            serde_json::json!({
                "merchant": "Shop",
                "items": [{"name": "Milk", "quantity": 0, "unit_price": 1.0}]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(post_json(
            "/api/users/999/transactions",
            serde_json::json!({
                "merchant": "Shop",
                "items": [{"name": "Milk", "unit_price": 1.0}]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_transactions_by_source() {
    let (app, alex, sam) = setup_seeded_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/transactions?source=sync&user_id={}", alex))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["deleted"], 0);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/transactions?source=sync")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(get_body_json(response).await["deleted"], 1);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/users/{}/transactions", sam)))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert!(json["transactions"].as_array().unwrap().is_empty());

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/transactions?source=bank")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Savings ==========

#[tokio::test]
async fn test_compare_items() {
    let (app, _, sam) = setup_seeded_app();

    let response = app
        .oneshot(post_json(
            "/api/savings/compare",
            serde_json::json!({
                "comparison_user_id": sam,
                "items": [
                    {"name": "milk", "quantity": 2, "unit_price": 4.00},
                    {"name": "caviar", "unit_price": 80.00}
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["items_compared"], 2);
    assert_eq!(json["items_matched"], 1);
    assert_eq!(json["items"][0]["merchant"], "Fresh Foods");
    assert_eq!(json["items"][0]["match_kind"], "exact");
    assert_eq!(json["items"][0]["savings"], 2.0);
    assert_eq!(json["items"][0]["savings_percent"], 25.0);
    assert_eq!(json["total_savings"], 2.0);
}

#[tokio::test]
async fn test_compare_rejects_empty_items() {
    let (app, _, sam) = setup_seeded_app();

    let response = app
        .oneshot(post_json(
            "/api/savings/compare",
            serde_json::json!({"comparison_user_id": sam, "items": []}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(json["kind"], "invalid_input");
}

#[tokio::test]
async fn test_malformed_requests_return_error_body() {
    let (app, _, sam) = setup_seeded_app();

    // Missing item list
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/savings/compare",
            serde_json::json!({"comparison_user_id": sam}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert_eq!(json["kind"], "invalid_input");
    assert!(json["error"].as_str().unwrap().contains("items"));

    // Item list that is not a list
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/savings/compare",
            serde_json::json!({"comparison_user_id": sam, "items": "milk"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(get_body_json(response).await["kind"], "invalid_input");

    // Body that is not JSON at all
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/savings/compare")
                .body(Body::from("milk"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(get_body_json(response).await["kind"], "invalid_input");

    let response = app
        .clone()
        .oneshot(get(&format!(
            "/api/savings/history?user_id=abc&comparison_user_id={}",
            sam
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(get_body_json(response).await["kind"], "invalid_input");

    let response = app.oneshot(get("/api/users/abc")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(get_body_json(response).await["kind"], "invalid_input");
}

#[tokio::test]
async fn test_frequency_savings() {
    let (app, alex, sam) = setup_seeded_app();

    let response = app
        .oneshot(get(&format!(
            "/api/savings/frequency?user_id={}&comparison_user_id={}",
            alex, sam
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let items = json["items"].as_array().unwrap();
    // Coffee: 4 bought at an average of 5.00 against 4.00
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["item_name"], "coffee");
    assert_eq!(items[0]["monthly_savings"], 1.33);
    assert_eq!(items[0]["annual_savings"], 16.0);
    assert_eq!(json["user_id"], alex);
}

#[tokio::test]
async fn test_savings_history() {
    let (app, alex, sam) = setup_seeded_app();

    let response = app
        .oneshot(get(&format!(
            "/api/savings/history?user_id={}&comparison_user_id={}",
            alex, sam
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let months = json["months"].as_array().unwrap();
    assert_eq!(months.len(), 2);
    assert_eq!(months[0]["month"], "2024-03");
    assert_eq!(months[0]["month_label"], "March 2024");
    // March: coffee 2 x 0.50 + whole milk 1.00 (fuzzy)
    assert_eq!(months[0]["savings"], 2.0);
    // February: coffee 2 x 1.50 + whole milk 1.00
    assert_eq!(months[1]["savings"], 4.0);
    assert_eq!(json["total_savings"], 6.0);
}

#[tokio::test]
async fn test_savings_projection() {
    let (app, alex, sam) = setup_seeded_app();

    let response = app
        .oneshot(get(&format!(
            "/api/savings/projection?user_id={}&comparison_user_id={}&as_of=2025-03-01",
            alex, sam
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let projection = &json["projection"];
    assert_eq!(projection["total_principal"], 6.0);
    assert_eq!(projection["months"][0]["months_elapsed"], 12);
    assert!(
        projection["total_future_value"].as_f64().unwrap()
            >= projection["total_principal"].as_f64().unwrap()
    );
    assert_eq!(json["history"]["months"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_savings_errors() {
    let (app, alex, sam) = setup_seeded_app();

    let response = app
        .clone()
        .oneshot(get(&format!(
            "/api/savings/history?user_id={}&comparison_user_id={}",
            alex, alex
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(get(&format!(
            "/api/savings/history?user_id=999&comparison_user_id={}",
            sam
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(get(&format!(
            "/api/savings/projection?user_id={}&comparison_user_id={}&as_of=soon",
            alex, sam
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Reports ==========

#[tokio::test]
async fn test_merchants_report() {
    let (app, alex, _) = setup_seeded_app();

    let response = app
        .clone()
        .oneshot(get(&format!("/api/reports/merchants?user_id={}", alex)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let merchants = json["merchants"].as_array().unwrap();
    assert_eq!(merchants.len(), 1);
    assert_eq!(merchants[0]["merchant"], "Corner Market");
    assert_eq!(merchants[0]["transaction_count"], 2);
    assert_eq!(json["limit"], 10);

    let response = app
        .oneshot(get("/api/reports/merchants?user_id=999"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
