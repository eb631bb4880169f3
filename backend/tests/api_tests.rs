//! HTTP API tests
//!
//! Drives the axum router over the in-memory store:
//! - Shop and beverage lists, health
//! - Error bodies carry a code and a notification level
//! - Catalog, price, ledger and summary endpoints end to end

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use bakery_backend::config::Config;
use bakery_backend::store::{DocumentStore, MemoryDocumentStore};
use bakery_backend::{create_app, AppState};

fn app() -> Router {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
    create_app(AppState::new(store, Config::default()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>, header::HeaderMap) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec(), headers)
}

async fn send_json(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes, _) = send(app, method, uri, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_shops_and_health() {
    let app = app();

    let (status, body) = send_json(&app, Method::GET, "/api/v1/shops", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shops"].as_array().unwrap().len(), 8);
    assert_eq!(body["shops"][4], json!("Maharagama A"));
    assert_eq!(body["beverages"], json!(["Nescafe", "Nestea"]));

    let (status, body) = send_json(&app, Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"], json!("connected"));
}

#[tokio::test]
async fn test_unknown_shop_and_bad_date() {
    let app = app();

    let (status, body) = send_json(&app, Method::GET, "/api/v1/shops/Colombo/items", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], json!("NOT_FOUND"));

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/v1/shops/Maharagama%20A/days/2024-13-01/sheet",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
    assert_eq!(body["error"]["level"], json!("warning"));
}

#[tokio::test]
async fn test_catalog_endpoints() {
    let mut config = Config::default();
    config.reorder.settle_delay_ms = 100;
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
    let app = create_app(AppState::new(store, config));
    let base = "/api/v1/shops/Maharagama%20B/items";

    let (status, body) = send_json(&app, Method::POST, base, Some(json!({ "itemName": "Bun" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["item"]["shop"], json!("Maharagama B"));
    assert_eq!(body["notice"]["level"], json!("success"));
    let bun_id = body["item"]["id"].as_str().unwrap().to_string();

    send_json(&app, Method::POST, base, Some(json!({ "itemName": "Roll" }))).await;

    let (status, body) = send_json(&app, Method::POST, base, Some(json!({ "itemName": "roll" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], json!("DUPLICATE_ENTRY"));
    assert_eq!(body["error"]["field"], json!("itemName"));

    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("{}/{}/move", base, bun_id),
        Some(json!({ "direction": "down" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], json!("moved"));
    assert_eq!(body["steps"].as_array().unwrap().len(), 3);

    // The shop stays locked for the settle delay
    let (_, body) = send_json(
        &app,
        Method::POST,
        &format!("{}/{}/move", base, bun_id),
        Some(json!({ "direction": "up" })),
    )
    .await;
    assert_eq!(body["outcome"], json!("busy"));

    tokio::time::sleep(Duration::from_millis(300)).await;

    // Last item cannot move down
    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("{}/{}/move", base, bun_id),
        Some(json!({ "direction": "down" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], json!("noOp"));

    let (_, body) = send_json(&app, Method::GET, base, None).await;
    let names: Vec<_> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["itemName"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Roll", "Bun"]);

    let (status, _) = send_json(
        &app,
        Method::PUT,
        &format!("{}/{}", base, bun_id),
        Some(json!({ "itemName": "Sugar Bun" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_json(&app, Method::DELETE, &format!("{}/{}", base, bun_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["item"]["itemName"], json!("Sugar Bun"));
}

#[tokio::test]
async fn test_day_flow() {
    let app = app();
    let shop = "/api/v1/shops/Katuwawala";

    send_json(&app, Method::POST, &format!("{}/items", shop), Some(json!({ "itemName": "Bun" }))).await;

    let (status, body) = send_json(
        &app,
        Method::PUT,
        &format!("{}/prices", shop),
        Some(json!({ "prices": [{ "itemName": "Bun", "price": 25 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["saved"], json!(1));

    let edits = json!({ "bakery": [{ "itemName": "Bun", "morningTime": 50, "remainingInventory": 10 }] });

    // Preview with unsaved edits
    let (status, body) = send_json(&app, Method::POST, &format!("{}/days/2024-01-02/sheet", shop), Some(edits.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"][0]["sellingQuantity"], json!(40));
    assert_eq!(body["rows"][0]["hasChanges"], json!(true));

    let (status, body) = send_json(&app, Method::POST, &format!("{}/days/2024-01-02/save", shop), Some(edits)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["saved"], json!(1));
    assert_eq!(body["notice"]["message"], json!("Successfully saved 1 items!"));

    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("{}/days/2024-01-02/save", shop),
        Some(json!({ "bakery": [{ "itemName": "Bun", "discard": -3 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], json!("Negative values are not allowed"));

    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("{}/days/2024-01-02/summary", shop),
        Some(json!({ "openingBalance": 500, "deposit": 1500, "cashierName": "Kamal" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["equation"]["status"], json!("balanced"));
    assert_eq!(body["cashierName"], json!("Kamal"));

    let (status, bytes, headers) = send(
        &app,
        Method::POST,
        &format!("{}/days/2024-01-02/summary?format=text", shop),
        Some(json!({ "openingBalance": 500, "deposit": 1500 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/plain"));
    assert!(headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("summary-Katuwawala-2024-01-02.txt"));
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("SOLD ITEMS BREAKDOWN"));

    let (status, _, headers) = send(
        &app,
        Method::POST,
        &format!("{}/days/2024-01-02/summary?format=csv", shop),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/csv");
}

#[tokio::test]
async fn test_store_offline_is_reported() {
    let memory = Arc::new(MemoryDocumentStore::new());
    let store: Arc<dyn DocumentStore> = memory.clone();
    let app = create_app(AppState::new(store, Config::default()));
    memory.set_unavailable(true).await;

    let (status, body) = send_json(&app, Method::GET, "/api/v1/shops/Koswatta/prices", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], json!("STORE_UNAVAILABLE"));
    assert_eq!(body["error"]["level"], json!("error"));

    let (_, body) = send_json(&app, Method::GET, "/api/v1/health", None).await;
    assert_eq!(body["store"], json!("disconnected"));
}
