//! assetdesk server library
//!
//! HTTP service for an internal marketing-asset portal: a catalogue of
//! videos, documents and links, each with an append-only version history
//! and a per-asset access control list.
//!
//! # Overview
//!
//! - **Version Ledger** ([`ledger`]): numbers versions `1, 2, 3, ...` per asset
//!   and moves the current-version pointer atomically with each insert
//! - **Access Evaluator** ([`access`]): pure view and download decisions from
//!   role, publish status, view scope, ACL rules and the clearance policy
//! - **Storage** ([`store`], [`db`]): one async trait per concern, backed by
//!   PostgreSQL in production and by [`store::MemoryStore`] in tests
//! - **Access log** ([`audit`]): who touched which asset, and why a denial happened
//! - **API** ([`api`], [`features`]): vertical feature slices under `/api/v1`
//!
//! # Architecture
//!
//! Write operations live in each feature's `commands/`, read operations in
//! `queries/`. Both take the resolved [`models::Principal`] explicitly; no
//! handler reads ambient user state. Every asset read passes through
//! `features::shared::gate`, which answers 404 before 403 and records
//! detail views and downloads in the access log.
//!
//! ## Framework Stack
//!
//! - **Axum**: routing and extractors
//! - **SQLx**: PostgreSQL access and embedded migrations
//! - **Tower**: middleware and service abstractions
//!
//! # Example
//!
//! ```no_run
//! use assetdesk_server::{
//!     access::AccessEvaluator, api, config::Config, features::FeatureState, store::MemoryStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let state = FeatureState::from_memory(MemoryStore::new(), AccessEvaluator::default(), 3);
//!     let app = api::create_router(state, &config);
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod access;
pub mod api;
pub mod audit;
pub mod config;
pub mod db;
pub mod features;
pub mod ledger;
pub mod middleware;
pub mod models;
pub mod store;
