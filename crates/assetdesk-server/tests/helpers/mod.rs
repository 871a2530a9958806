//! Shared helpers for HTTP-level tests
//!
//! The router is the real one from `api::create_router`, backed by a
//! `MemoryStore` so no database is needed.

#![allow(dead_code)]

use assetdesk_common::types::RoleCode;
use assetdesk_server::{
    access::AccessEvaluator, api, config::Config, features::FeatureState, models::Principal,
    store::MemoryStore,
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub admin: Principal,
    pub user: Principal,
}

impl TestApp {
    pub async fn new() -> Self {
        let store = MemoryStore::new();
        let admin = Principal::new(Uuid::new_v4()).with_role(RoleCode::Admin);
        let user = Principal::new(Uuid::new_v4())
            .with_role(RoleCode::User)
            .in_department(Uuid::new_v4());
        store.insert_principal(admin.clone()).await;
        store.insert_principal(user.clone()).await;

        let state = FeatureState::from_memory(store.clone(), AccessEvaluator::default(), 3);
        let router = api::create_router(state, &Config::default());

        Self {
            router,
            store,
            admin,
            user,
        }
    }

    pub async fn register(&self, principal: Principal) -> Principal {
        self.store.insert_principal(principal.clone()).await;
        principal
    }

    /// Send a request, optionally as `as_user`, and decode the JSON body
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        as_user: Option<Uuid>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(id) = as_user {
            builder = builder.header("x-user-id", id.to_string());
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, as_user: Uuid) -> (StatusCode, Value) {
        self.send("GET", uri, Some(as_user), None).await
    }

    pub async fn post(&self, uri: &str, as_user: Uuid, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(as_user), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, as_user: Uuid, body: Value) -> (StatusCode, Value) {
        self.send("PATCH", uri, Some(as_user), Some(body)).await
    }

    pub async fn put(&self, uri: &str, as_user: Uuid, body: Value) -> (StatusCode, Value) {
        self.send("PUT", uri, Some(as_user), Some(body)).await
    }

    /// Create an asset as admin and return its id
    pub async fn create_asset(&self, body: Value) -> Uuid {
        let (status, json) = self.post("/api/v1/assets", self.admin.id, body).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {json}");
        json["data"]["id"].as_str().unwrap().parse().unwrap()
    }

    /// Create an asset and publish it
    pub async fn published_asset(&self, body: Value) -> Uuid {
        let id = self.create_asset(body).await;
        let (status, _) = self
            .patch(
                &format!("/api/v1/assets/{id}"),
                self.admin.id,
                serde_json::json!({ "publish_status": "PUBLISHED" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        id
    }
}
