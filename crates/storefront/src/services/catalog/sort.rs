//! Product listing order.

use std::borrow::Borrow;
use std::cmp::Ordering;

use ethereal_cart_core::{Product, ProductId, SortKey};

/// Sort products in place by `key`.
///
/// The sort is stable: products with equal keys keep their relative order,
/// so [`SortKey::Featured`] leaves the catalog order intact within the
/// featured and non-featured groups.
pub fn sort_products<P: Borrow<Product>>(products: &mut [P], key: SortKey) {
    match key {
        SortKey::Featured => {
            products.sort_by(|a, b| b.borrow().featured.cmp(&a.borrow().featured));
        }
        SortKey::PriceLow => products.sort_by(|a, b| a.borrow().price.cmp(&b.borrow().price)),
        SortKey::PriceHigh => products.sort_by(|a, b| b.borrow().price.cmp(&a.borrow().price)),
        SortKey::Rating => {
            products.sort_by(|a, b| b.borrow().rating.total_cmp(&a.borrow().rating));
        }
        SortKey::Newest => products.sort_by(|a, b| newest_first(&a.borrow().id, &b.borrow().id)),
    }
}

/// Highest id first. Numeric ids compare numerically and rank ahead of
/// non-numeric ids, which fall back to reverse lexicographic order.
fn newest_first(a: &ProductId, b: &ProductId) -> Ordering {
    match (a.as_str().parse::<u64>(), b.as_str().parse::<u64>()) {
        (Ok(a), Ok(b)) => b.cmp(&a),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => b.cmp(a),
    }
}
