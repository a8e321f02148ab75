//! Product listing filter.

use ethereal_cart_core::{Product, ProductFilter};

use super::Catalog;

/// Apply a [`ProductFilter`] to the catalog.
///
/// Predicates run in a fixed order: category slug equality, inclusive price
/// bounds, stock equality, then case-insensitive substring search over name,
/// description and tags. Results keep catalog insertion order. An unknown
/// category slug matches nothing; an empty result is not an error.
#[must_use]
pub fn filter_products<'a>(catalog: &'a Catalog, filter: &ProductFilter) -> Vec<&'a Product> {
    let category_id = match filter.category_slug() {
        Some(slug) => match catalog.category_by_slug(slug) {
            Some(category) => Some(&category.id),
            None => return Vec::new(),
        },
        None => None,
    };
    let needle = filter.search_needle();

    catalog
        .products()
        .iter()
        .filter(|p| category_id.is_none_or(|id| p.category_id == *id))
        .filter(|p| filter.min_price.is_none_or(|min| p.price >= min))
        .filter(|p| filter.max_price.is_none_or(|max| p.price <= max))
        .filter(|p| filter.in_stock.is_none_or(|in_stock| p.in_stock == in_stock))
        .filter(|p| needle.as_deref().is_none_or(|n| p.matches_text(n)))
        .collect()
}
