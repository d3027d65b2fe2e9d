//! Common test utilities and helpers.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;

use freshsaver::config::AuthConfig;
use freshsaver::identity::Caller;
use freshsaver::middleware::Claims;
use freshsaver::services::{InventoryService, ProductScope};
use freshsaver::store::{Document, DocumentStore, Fields, Filter, MemoryStore};
use freshsaver::{api, AppState, Error, Result};

pub const TEST_SECRET: &str = "freshsaver-test-secret";

/// One successful store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    pub op: &'static str,
    pub collection: String,
    pub id: String,
}

/// Store decorator that records every successful write and can be told to
/// fail a given operation on a given collection.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    calls: Mutex<Vec<StoreCall>>,
    failure: Mutex<Option<(&'static str, String)>>,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every later `op` on `collection` fail with a backend error.
    pub fn fail_on(&self, op: &'static str, collection: &str) {
        *self.failure.lock().unwrap() = Some((op, collection.to_string()));
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded calls of one kind, in order.
    pub fn calls_of(&self, op: &str, collection: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.op == op && c.collection == collection)
            .map(|c| c.id)
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub async fn count(&self, collection: &str) -> usize {
        self.inner.count(collection).await
    }

    fn check(&self, op: &'static str, collection: &str) -> Result<()> {
        match &*self.failure.lock().unwrap() {
            Some((failing_op, failing_collection))
                if *failing_op == op && failing_collection == collection =>
            {
                Err(Error::Backend(format!("injected {} failure on {}", op, collection)))
            }
            _ => Ok(()),
        }
    }

    fn record(&self, op: &'static str, collection: &str, id: &str) {
        self.calls.lock().unwrap().push(StoreCall {
            op,
            collection: collection.to_string(),
            id: id.to_string(),
        });
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    fn backend_name(&self) -> &'static str {
        "recording"
    }

    async fn query(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Document>> {
        self.check("query", collection)?;
        self.inner.query(collection, filters).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.check("get", collection)?;
        self.inner.get(collection, id).await
    }

    async fn insert(&self, collection: &str, fields: Fields) -> Result<String> {
        self.check("insert", collection)?;
        let id = self.inner.insert(collection, fields).await?;
        self.record("insert", collection, &id);
        Ok(id)
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        self.check("set", collection)?;
        self.inner.set(collection, id, fields).await?;
        self.record("set", collection, id);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.check("delete", collection)?;
        self.inner.delete(collection, id).await?;
        self.record("delete", collection, id);
        Ok(())
    }
}

/// Build a JSON document body.
pub fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        other => panic!("document bodies must be objects, got {}", other),
    }
}

/// Inventory service acting as `user_id` (anonymous for `None`).
pub fn inventory(store: Arc<dyn DocumentStore>, user_id: Option<&str>) -> InventoryService {
    let caller = match user_id {
        Some(id) => Caller::user(id),
        None => Caller::anonymous(),
    };
    InventoryService::new(store, caller.into_provider())
}

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: TEST_SECRET.to_string(),
        jwt_issuer: None,
    }
}

/// Signed bearer token for `user_id`, valid for an hour.
pub fn token_for(user_id: &str) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        iss: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("Failed to sign token")
}

/// Router wired the same way as the server binary, minus the outer layers.
pub fn test_app(store: Arc<dyn DocumentStore>) -> (Router, AppState) {
    let state = AppState::from_parts(store, ProductScope::default(), auth_config());
    let app = api::routes(state.clone()).with_state(state.clone());
    (app, state)
}

/// Extract JSON body from response
pub async fn extract_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

fn builder(method: &str, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header("Authorization", format!("Bearer {}", token)),
        None => builder,
    }
}

/// Create a GET request
pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    builder("GET", uri, token).body(Body::empty()).unwrap()
}

/// Create a POST request with JSON body
pub fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    builder("POST", uri, token)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Create a PUT request with JSON body
pub fn put_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    builder("PUT", uri, token)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Create a DELETE request
pub fn delete_request(uri: &str, token: Option<&str>) -> Request<Body> {
    builder("DELETE", uri, token).body(Body::empty()).unwrap()
}
