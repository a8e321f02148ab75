//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `catalog` - Read-only product and category store with filtering and sorting
//! - `cart` - Persistent cart lines, order totals and change notifications
//! - `latency` - Simulated network delay applied to service calls

pub mod cart;
pub mod catalog;
pub mod latency;

pub use cart::{CartError, CartService};
pub use catalog::{Catalog, CatalogError};
pub use latency::Latency;
