//! HTTP API integration tests.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use common::*;
use freshsaver::store::collections::{CATEGORIES, PRODUCTS, PRODUCT_TYPES};
use freshsaver::store::DocumentStore;

async fn seeded() -> (axum::Router, std::sync::Arc<RecordingStore>) {
    let store = RecordingStore::new();
    store
        .set(CATEGORIES, "dairy", fields(json!({"user_id": "global", "title": "Dairy"})))
        .await
        .unwrap();
    store
        .set(CATEGORIES, "mine", fields(json!({"user_id": "u1", "title": "Mine"})))
        .await
        .unwrap();
    store
        .set(
            PRODUCT_TYPES,
            "milk",
            fields(json!({
                "category_id": "dairy",
                "user_id": "global",
                "title": "Milk",
                "time_to_expire": 60 * 24 * 7,
            })),
        )
        .await
        .unwrap();
    store
        .set(
            PRODUCT_TYPES,
            "cheese",
            fields(json!({"category_id": "dairy", "user_id": "global", "title": "Cheese"})),
        )
        .await
        .unwrap();

    let (app, _) = test_app(store.clone());
    (app, store)
}

#[tokio::test]
async fn test_health() {
    let (app, _) = seeded().await;

    let response = app
        .oneshot(get_request("/health/ready", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response).await;
    assert_eq!(body["ready"], true);
}

#[tokio::test]
async fn test_anonymous_sees_only_global_categories() {
    let (app, _) = seeded().await;

    let response = app.oneshot(get_request("/categories", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response).await;
    let ids: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["dairy"]);
}

#[tokio::test]
async fn test_owner_sees_own_categories() {
    let (app, _) = seeded().await;
    let token = token_for("u1");

    let response = app
        .oneshot(get_request("/categories", Some(&token)))
        .await
        .unwrap();

    let body = extract_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_bad_token_is_rejected() {
    let (app, _) = seeded().await;

    let response = app
        .oneshot(get_request("/categories", Some("not-a-jwt")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = extract_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_create_product_without_shelf_life_conflicts() {
    let (app, store) = seeded().await;
    let token = token_for("u1");

    let response = app
        .oneshot(post_json(
            "/products",
            Some(&token),
            json!({"product_type_id": "cheese", "purchase_date": 0}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = extract_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_STATE");
    assert_eq!(store.count(PRODUCTS).await, 0);
}

#[tokio::test]
async fn test_create_and_list_products() {
    let (app, _) = seeded().await;
    let token = token_for("u1");
    let now = chrono::Utc::now().timestamp_millis();

    let response = app
        .clone()
        .oneshot(post_json(
            "/products",
            Some(&token),
            json!({"product_type_id": "milk", "purchase_date": now - 1000, "cost": 1.25}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = extract_json(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(get_request("/products", Some(&token)))
        .await
        .unwrap();
    let body = extract_json(response).await;
    let products = body.as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["id"], id.as_str());
    assert_eq!(products[0]["days_left"], 6);
    assert_eq!(products[0]["expired"], false);

    // Another user cannot see it
    let other = token_for("u2");
    let response = app
        .oneshot(get_request(&format!("/products/{}", id), Some(&other)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_anonymous_cannot_create() {
    let (app, _) = seeded().await;

    let response = app
        .oneshot(post_json("/categories", None, json!({"title": "Snacks"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = extract_json(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_empty_title_is_rejected() {
    let (app, _) = seeded().await;
    let token = token_for("u1");

    let response = app
        .oneshot(post_json("/categories", Some(&token), json!({"title": "  "})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_global_category_is_read_only() {
    let (app, store) = seeded().await;
    let token = token_for("u1");

    let response = app
        .clone()
        .oneshot(delete_request("/categories/dairy", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(put_json(
            "/categories/dairy",
            Some(&token),
            json!({"title": "Not dairy"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(store.count(CATEGORIES).await, 2);
}

#[tokio::test]
async fn test_owned_category_update_and_delete() {
    let (app, store) = seeded().await;
    let token = token_for("u1");

    let response = app
        .clone()
        .oneshot(put_json(
            "/categories/mine",
            Some(&token),
            json!({"title": "Freezer"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response).await;
    assert_eq!(body["title"], "Freezer");
    assert_eq!(body["user_id"], "u1");

    let response = app
        .oneshot(delete_request("/categories/mine", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.calls_of("delete", CATEGORIES), vec!["mine"]);
}

#[tokio::test]
async fn test_other_users_category_is_hidden() {
    let (app, _) = seeded().await;
    let token = token_for("u2");

    let response = app
        .oneshot(get_request("/categories/mine/product-types", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ranked_recipes() {
    let (app, _) = seeded().await;
    let token = token_for("u1");
    let now = chrono::Utc::now().timestamp_millis();

    for (title, ingredients) in [("Fondue", vec!["cheese"]), ("Latte", vec!["milk"])] {
        let response = app
            .clone()
            .oneshot(post_json(
                "/recipes",
                Some(&token),
                json!({"title": title, "product_type_ids": ingredients, "text": "..."}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    app.clone()
        .oneshot(post_json(
            "/products",
            Some(&token),
            json!({"product_type_id": "milk", "purchase_date": now}),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(get_request("/recipes", Some(&token)))
        .await
        .unwrap();
    let body = extract_json(response).await;
    let recipes = body.as_array().unwrap();

    assert_eq!(recipes[0]["title"], "Latte");
    assert_eq!(recipes[0]["score"], 1);
    assert_eq!(recipes[0]["ingredients"], json!(["Milk"]));
    assert_eq!(recipes[1]["title"], "Fondue");
    assert_eq!(recipes[1]["score"], 0);
}

#[tokio::test]
async fn test_global_subject_cannot_write_shared_data() {
    let (app, store) = seeded().await;
    let token = token_for("global");

    let response = app
        .clone()
        .oneshot(put_json(
            "/categories/dairy",
            Some(&token),
            json!({"title": "Hijacked"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(post_json("/categories", Some(&token), json!({"title": "Injected"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(store.calls_of("insert", CATEGORIES).is_empty());

    let response = app.oneshot(get_request("/categories", None)).await.unwrap();
    let body = extract_json(response).await;
    assert_eq!(body, json!([{"id": "dairy", "user_id": "global", "title": "Dairy", "image_url": null}]));
}

#[tokio::test]
async fn test_recipe_cannot_reference_private_product_types() {
    let (app, store) = seeded().await;
    store
        .set(
            PRODUCT_TYPES,
            "secret-sauce",
            fields(json!({"category_id": "mine", "user_id": "u1", "title": "Secret sauce"})),
        )
        .await
        .unwrap();
    let token = token_for("u2");

    let response = app
        .clone()
        .oneshot(post_json(
            "/recipes",
            Some(&token),
            json!({"title": "Leak", "product_type_ids": ["milk", "secret-sauce"]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(post_json(
            "/recipes",
            Some(&token),
            json!({"title": "Cereal", "product_type_ids": ["milk"]}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}
