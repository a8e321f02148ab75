//! Catalog inspection commands.
//!
//! # Usage
//!
//! ```bash
//! ec-cli catalog validate
//! ec-cli catalog list --search crystal --sort rating
//! ec-cli catalog show 3
//! ec-cli catalog search head
//! ```

use serde::Serialize;

use ethereal_cart_core::{Product, ProductFilter, SortKey};

use super::{CommandError, Context, print_json};

/// Catalog summary printed by `validate`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSummary {
    pub categories: usize,
    pub products: usize,
    pub in_stock: usize,
    pub featured: usize,
}

impl CatalogSummary {
    fn of(products: &[Product], categories: usize) -> Self {
        Self {
            categories,
            products: products.len(),
            in_stock: products.iter().filter(|p| p.in_stock).count(),
            featured: products.iter().filter(|p| p.featured).count(),
        }
    }
}

/// Print a summary of the loaded catalog.
///
/// Loading already enforced every integrity rule, so reaching this point
/// means the catalog is valid.
pub fn validate(ctx: &Context) -> Result<(), CommandError> {
    let summary = CatalogSummary::of(ctx.catalog.products(), ctx.catalog.categories().len());
    tracing::info!(
        products = summary.products,
        categories = summary.categories,
        "Catalog is valid"
    );
    print_json(&summary)
}

/// Print products matching `filter` in `sort` order.
pub fn list(ctx: &Context, filter: &ProductFilter, sort: SortKey) -> Result<(), CommandError> {
    let products = ctx.catalog.query(filter, sort);
    tracing::info!(count = products.len(), %sort, "Products matched");
    print_json(&products)
}

/// Print a single product.
pub fn show(ctx: &Context, id: &str) -> Result<(), CommandError> {
    let product = ctx
        .catalog
        .product(id)
        .ok_or_else(|| CommandError::NotFound(format!("product {id}")))?;
    print_json(product)
}

/// Print autocomplete suggestions for `query`.
pub fn search(ctx: &Context, query: &str) -> Result<(), CommandError> {
    print_json(&ctx.catalog.search_suggestions(query))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ethereal_cart_storefront::services::Catalog;

    use super::*;

    #[test]
    fn test_summary_counts_embedded_catalog() {
        let catalog = Catalog::embedded().unwrap();
        let summary = CatalogSummary::of(catalog.products(), catalog.categories().len());

        assert_eq!(summary.products, catalog.products().len());
        assert_eq!(summary.categories, 6);
        assert!(summary.in_stock < summary.products);
        assert!(summary.featured > 0);
    }
}
