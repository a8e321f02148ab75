//! Core types for Ethereal Cart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;
pub mod query;
pub mod slug;

pub use cart::{CartLine, total_quantity};
pub use id::*;
pub use price::{CurrencyCode, Price, round_money};
pub use product::{Category, MAX_RATING, Product, ProductError};
pub use query::{ProductFilter, SortKey};
pub use slug::{Slug, SlugError};
