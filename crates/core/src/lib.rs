//! Ethereal Cart Core - Shared types library.
//!
//! This crate provides common types used across all Ethereal Cart components:
//! - `storefront` - Catalog and cart service with its JSON API
//! - `cli` - Command-line tools for browsing the catalog and managing a cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no storage,
//! no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, slugs, prices, catalog entities, cart lines and
//!   listing queries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
