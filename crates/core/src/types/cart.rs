//! Cart line type shared by the service, persistence and API layers.

use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// One product-and-quantity pairing in a cart.
///
/// A cart holds at most one line per product and every line has a
/// quantity of at least one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl CartLine {
    /// Create a new cart line.
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// Total number of units across all lines (the cart badge count).
#[must_use]
pub fn total_quantity(lines: &[CartLine]) -> u64 {
    lines.iter().map(|line| u64::from(line.quantity)).sum()
}
