//! Ethereal Cart storefront library.
//!
//! This crate provides the catalog, cart and HTTP layers as a library,
//! allowing them to be tested and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
