use std::sync::Arc;

use axum::http::{HeaderValue, StatusCode, header::ACCEPT_LANGUAGE};
use axum_test::TestServer;
use quarry_api::{
    application::http::server::{app_state::AppState, http_server::router},
    args::Args,
};
use quarry_core::{
    domain::common::ObjectStorageConfig,
    entity::categories,
    infrastructure::{db::schema::create_schema, object_storage::minio::MinioObjectStorage},
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectOptions, Database, DatabaseConnection,
};
use serde_json::{Value, json};

async fn setup() -> (TestServer, DatabaseConnection) {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("in-memory sqlite connects");
    create_schema(&db).await.expect("schema is created");

    let storage = MinioObjectStorage::new(ObjectStorageConfig {
        endpoint: "http://127.0.0.1:9".to_string(),
        region: "us-east-1".to_string(),
        access_key: "test".to_string(),
        secret_key: "test".to_string(),
        bucket: "catalog".to_string(),
    });

    let state = AppState::new(Arc::new(Args::default()), db.clone(), storage)
        .expect("state builds");
    let server = TestServer::new(router(state).expect("router builds")).expect("server starts");

    (server, db)
}

async fn create(server: &TestServer, slug: &str, title: &str, price: f64) -> Value {
    let response = server
        .post("/products")
        .json(&json!({
            "slug": slug,
            "title": title,
            "status": "active",
            "price": price,
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

#[tokio::test]
async fn create_with_nested_collections_and_show() {
    let (server, db) = setup().await;
    let summer = categories::ActiveModel {
        name: Set("Summer".to_string()),
        ..Default::default()
    }
    .insert(&db)
    .await
    .expect("category is inserted");

    let response = server
        .post("/products")
        .json(&json!({
            "slug": "linen-shirt",
            "title": "Linen shirt",
            "status": "active",
            "price": 49.9,
            "images": [
                { "uri": "products/linen-front.jpg", "primary": true },
                { "uri": "products/linen-back.jpg" },
            ],
            "options": [{
                "name": "Size",
                "required": true,
                "values": [{ "value": "M", "fee": 0 }, { "value": "L", "fee": 2 }],
            }],
            "features": [{ "name": "Material", "value": "Linen" }],
            "categories": [{ "id": summer.id }],
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["data"]["slug"], "linen-shirt");
    assert_eq!(body["data"]["images"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["data"]["options_count"], 1);
    assert_eq!(body["data"]["features"][0]["pivot"]["value"], "Linen");

    let shown = server.get("/products/linen-shirt").await;
    shown.assert_status_ok();
    let shown = shown.json::<Value>();
    assert_eq!(shown["data"]["images"][0]["uri"], "products/linen-front.jpg");
    assert_eq!(shown["data"]["brand"], Value::Null);

    let filtered = server
        .get("/products")
        .add_query_param("category", summer.id)
        .await;
    filtered.assert_status_ok();
    assert_eq!(filtered.json::<Value>().as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn list_paginates_with_links() {
    let (server, _db) = setup().await;
    for (slug, price) in [("a", 3.0), ("b", 1.0), ("c", 2.0)] {
        create(&server, slug, &format!("Shirt {slug}"), price).await;
    }
    create(&server, "mug", "Mug", 9.0).await;

    let response = server
        .get("/products")
        .add_query_param("q", "shirt")
        .add_query_param("sort_by", "price")
        .add_query_param("sort_type", "desc")
        .add_query_param("per_page", "2")
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    let slugs = body["data"]
        .as_array()
        .expect("page data")
        .iter()
        .map(|product| product["slug"].as_str().unwrap_or_default().to_string())
        .collect::<Vec<_>>();
    assert_eq!(slugs, vec!["a", "c"]);
    assert_eq!(body["total"], 3);
    assert_eq!(body["last_page"], 2);
    assert_eq!(body["has_more_pages"], true);
    assert_eq!(
        body["links"]["next"],
        "/products?per_page=2&q=shirt&sort_by=price&sort_type=desc&page=2"
    );
}

#[tokio::test]
async fn list_without_per_page_returns_an_array() {
    let (server, _db) = setup().await;
    create(&server, "a", "A", 1.0).await;
    create(&server, "b", "B", 1.0).await;

    let response = server.get("/products").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>().as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn invalid_filter_value_is_a_bad_request() {
    let (server, _db) = setup().await;

    let response = server
        .get("/products")
        .add_query_param("brand", "acme")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "E_BAD_REQUEST");
}

#[tokio::test]
async fn missing_product_is_not_found() {
    let (server, _db) = setup().await;

    let response = server.get("/products/nothing-here").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["status"], 404);
}

#[tokio::test]
async fn invalid_bodies_are_unprocessable() {
    let (server, _db) = setup().await;

    let blank = server
        .post("/products")
        .json(&json!({ "slug": "", "title": "X", "status": "draft", "price": 1 }))
        .await;
    blank.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    create(&server, "shirt", "Shirt", 10.0).await;
    let malformed = server
        .put("/products/shirt")
        .json(&json!({ "images": [{ "primary": true }] }))
        .await;
    malformed.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let message = malformed.json::<Value>()["message"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    assert!(message.contains("images[0]"), "{message}");
}

#[tokio::test]
async fn malformed_nested_payload_writes_nothing() {
    let (server, _db) = setup().await;

    let rejected = server
        .post("/products")
        .json(&json!({
            "slug": "shirt",
            "title": "Shirt",
            "status": "active",
            "price": 10,
            "images": [{ "primary": true }],
        }))
        .await;
    rejected.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    server
        .get("/products/shirt")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    create(&server, "shirt", "Shirt", 10.0).await;

    server
        .put("/products/shirt")
        .json(&json!({
            "price": 99,
            "options": [{ "name": "Size", "required": true, "values": [{ "value": "S" }] }],
        }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let shown = server.get("/products/shirt").await;
    shown.assert_status_ok();
    assert_eq!(shown.json::<Value>()["data"]["price"], 10.0);
}

#[tokio::test]
async fn update_changes_attributes_and_translations() {
    let (server, _db) = setup().await;
    create(&server, "shirt", "Shirt", 10.0).await;

    let response = server
        .put("/products/shirt")
        .add_header(ACCEPT_LANGUAGE, HeaderValue::from_static("fr-FR"))
        .json(&json!({
            "price": 12.5,
            "options": [{ "name": "Taille", "required": false }],
        }))
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["data"]["price"], 12.5);
    assert_eq!(body["data"]["title"], "Shirt");
    assert_eq!(body["data"]["options_count"], 1);
}

#[tokio::test]
async fn delete_then_force_delete() {
    let (server, _db) = setup().await;
    create(&server, "shirt", "Shirt", 10.0).await;

    server
        .delete("/products/shirt")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get("/products/shirt")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server
        .delete("/products/shirt/force")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .delete("/products/shirt/force")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn openapi_document_lists_product_routes() {
    let (server, _db) = setup().await;

    let response = server.get("/api-docs/openapi.json").await;
    response.assert_status_ok();

    let document = response.json::<Value>();
    assert!(document["paths"].get("/products").is_some());
    assert!(document["paths"].get("/products/{slug}/force").is_some());
}
