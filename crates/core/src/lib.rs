//! okome-core - Shared types for the okome-site backend.
//!
//! This crate contains only types - no I/O, no database access, no HTTP
//! clients. The `backend` crate builds its repositories, services and routes
//! on top of these.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, email, order status enums, and yen amounts

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
