//! Okome backend library.
//!
//! Order/webhook ingestion and the customer-facing JSON API, exposed as a
//! library so it can be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;
