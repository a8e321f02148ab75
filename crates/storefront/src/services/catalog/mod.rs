//! Catalog store: the static product and category list.
//!
//! The catalog is loaded once at startup (from the embedded document or a
//! JSON file), validated, and never mutated afterwards. All queries are pure
//! and return borrowed products in catalog insertion order unless sorted.

pub mod filter;
pub mod sort;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use ethereal_cart_core::{
    Category, CategoryId, Product, ProductError, ProductFilter, ProductId, Slug, SortKey,
};

pub use filter::filter_products;
pub use sort::sort_products;

/// Catalog document shipped with the binary.
const EMBEDDED_CATALOG: &str = include_str!("../../../data/catalog.json");

/// Maximum number of related products returned for a product page.
pub const RELATED_PRODUCTS_LIMIT: usize = 4;

/// Maximum number of autocomplete suggestions.
pub const SEARCH_SUGGESTION_LIMIT: usize = 5;

/// Errors loading or validating a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate product id: {0}")]
    DuplicateProduct(ProductId),

    #[error("duplicate category id: {0}")]
    DuplicateCategory(CategoryId),

    #[error("duplicate category slug: {0}")]
    DuplicateSlug(Slug),

    #[error("product {product} references unknown category {category}")]
    UnknownCategory {
        product: ProductId,
        category: CategoryId,
    },

    #[error("invalid product {id}: {source}")]
    InvalidProduct {
        id: ProductId,
        #[source]
        source: ProductError,
    },
}

/// On-disk catalog representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
}

/// Read-only product and category store.
#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<Category>,
    products: Vec<Product>,
    product_index: HashMap<ProductId, usize>,
    category_index: HashMap<CategoryId, usize>,
    slug_index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from categories and products, enforcing uniqueness
    /// and referential integrity.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] on duplicate ids or slugs, a product that
    /// references an unknown category, or a product failing validation.
    pub fn new(categories: Vec<Category>, products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut category_index = HashMap::with_capacity(categories.len());
        let mut slug_index = HashMap::with_capacity(categories.len());
        for (idx, category) in categories.iter().enumerate() {
            if category_index.insert(category.id.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateCategory(category.id.clone()));
            }
            if slug_index
                .insert(category.slug.as_str().to_owned(), idx)
                .is_some()
            {
                return Err(CatalogError::DuplicateSlug(category.slug.clone()));
            }
        }

        let mut product_index = HashMap::with_capacity(products.len());
        for (idx, product) in products.iter().enumerate() {
            product
                .validate()
                .map_err(|source| CatalogError::InvalidProduct {
                    id: product.id.clone(),
                    source,
                })?;
            if !category_index.contains_key(&product.category_id) {
                return Err(CatalogError::UnknownCategory {
                    product: product.id.clone(),
                    category: product.category_id.clone(),
                });
            }
            if product_index.insert(product.id.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateProduct(product.id.clone()));
            }
        }

        Ok(Self {
            categories,
            products,
            product_index,
            category_index,
            slug_index,
        })
    }

    /// Parse and validate a catalog JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] for malformed JSON and the validation
    /// errors of [`Catalog::new`] otherwise.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        Self::new(document.categories, document.products)
    }

    /// The catalog bundled with the storefront.
    ///
    /// # Errors
    ///
    /// Only fails if the bundled document is invalid.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read, plus the
    /// errors of [`Catalog::from_json`].
    #[instrument(skip_all, fields(path = %path.display()))]
    pub async fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CatalogError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(
            products = catalog.products.len(),
            categories = catalog.categories.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    /// All products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// All categories in catalog order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Look up a product by id.
    #[must_use]
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.product_index
            .get(id)
            .and_then(|&idx| self.products.get(idx))
    }

    /// Whether a product id resolves in the catalog.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.product_index.contains_key(id)
    }

    /// Look up a category by id.
    #[must_use]
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.category_index
            .get(id)
            .and_then(|&idx| self.categories.get(idx))
    }

    /// Look up a category by slug.
    #[must_use]
    pub fn category_by_slug(&self, slug: &str) -> Option<&Category> {
        self.slug_index
            .get(slug)
            .and_then(|&idx| self.categories.get(idx))
    }

    /// Filter the catalog. See [`filter_products`] for the matching rules.
    #[must_use]
    pub fn list_products(&self, filter: &ProductFilter) -> Vec<&Product> {
        filter_products(self, filter)
    }

    /// Filter then sort the catalog.
    #[must_use]
    pub fn query(&self, filter: &ProductFilter, sort: SortKey) -> Vec<&Product> {
        let mut products = self.list_products(filter);
        sort_products(&mut products, sort);
        products
    }

    /// Featured products in catalog order.
    #[must_use]
    pub fn featured_products(&self) -> Vec<&Product> {
        self.products.iter().filter(|p| p.featured).collect()
    }

    /// Other products in the same category, at most [`RELATED_PRODUCTS_LIMIT`].
    ///
    /// Returns an empty list for an unknown product.
    #[must_use]
    pub fn related_products(&self, id: &str) -> Vec<&Product> {
        let Some(product) = self.product(id) else {
            return Vec::new();
        };

        self.products
            .iter()
            .filter(|p| p.id != product.id && p.category_id == product.category_id)
            .take(RELATED_PRODUCTS_LIMIT)
            .collect()
    }

    /// Autocomplete suggestions: name or description matches only, at most
    /// [`SEARCH_SUGGESTION_LIMIT`]. A blank query yields nothing.
    #[must_use]
    pub fn search_suggestions(&self, query: &str) -> Vec<&Product> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.products
            .iter()
            .filter(|p| p.matches_name_or_description(&needle))
            .take(SEARCH_SUGGESTION_LIMIT)
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::collections::BTreeMap;

    use rust_decimal::Decimal;

    use super::*;

    pub(crate) fn category(id: &str, slug: &str) -> Category {
        Category {
            id: CategoryId::new(id),
            name: slug.to_uppercase(),
            slug: Slug::parse(slug).unwrap(),
            description: String::new(),
            image: String::new(),
        }
    }

    pub(crate) fn product(id: &str, category_id: &str, price: i64, in_stock: bool) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Decimal::new(price, 0),
            original_price: None,
            images: vec![format!("/img/{id}.png")],
            category_id: CategoryId::new(category_id),
            rating: 4.0,
            review_count: 0,
            in_stock,
            featured: false,
            tags: Vec::new(),
            specifications: BTreeMap::new(),
        }
    }

    #[test]
    fn test_embedded_catalog_is_valid() {
        let catalog = Catalog::embedded().unwrap();
        assert!(!catalog.products().is_empty());
        assert_eq!(catalog.categories().len(), 6);
        assert!(catalog.category_by_slug("home-living").is_some());
    }

    #[test]
    fn test_duplicate_product_rejected() {
        let result = Catalog::new(
            vec![category("1", "books")],
            vec![product("1", "1", 10, true), product("1", "1", 20, true)],
        );
        assert!(matches!(result, Err(CatalogError::DuplicateProduct(_))));
    }

    #[test]
    fn test_duplicate_slug_rejected() {
        let result = Catalog::new(
            vec![category("1", "books"), category("2", "books")],
            Vec::new(),
        );
        assert!(matches!(result, Err(CatalogError::DuplicateSlug(_))));
    }

    #[test]
    fn test_unknown_category_rejected() {
        let result = Catalog::new(
            vec![category("1", "books")],
            vec![product("1", "9", 10, true)],
        );
        assert!(matches!(result, Err(CatalogError::UnknownCategory { .. })));
    }

    #[test]
    fn test_invalid_product_rejected() {
        let mut bad = product("1", "1", 10, true);
        bad.images.clear();
        let result = Catalog::new(vec![category("1", "books")], vec![bad]);
        assert!(matches!(result, Err(CatalogError::InvalidProduct { .. })));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Catalog::from_json("{not json"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_product_lookup() {
        let catalog = Catalog::new(
            vec![category("1", "books")],
            vec![product("1", "1", 10, true)],
        )
        .unwrap();
        assert_eq!(catalog.product("1").unwrap().price, Decimal::new(10, 0));
        assert!(catalog.product("2").is_none());
        assert!(catalog.contains("1"));
    }

    #[test]
    fn test_related_products_same_category_excluding_self() {
        let catalog = Catalog::new(
            vec![category("1", "books"), category("2", "sports")],
            vec![
                product("1", "1", 10, true),
                product("2", "1", 10, true),
                product("3", "2", 10, true),
                product("4", "1", 10, true),
                product("5", "1", 10, true),
                product("6", "1", 10, true),
                product("7", "1", 10, true),
            ],
        )
        .unwrap();

        let related: Vec<&str> = catalog
            .related_products("1")
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(related, vec!["2", "4", "5", "6"]);
        assert!(catalog.related_products("missing").is_empty());
    }

    #[test]
    fn test_search_suggestions_ignore_tags_and_limit() {
        let mut products: Vec<Product> = (1..=7)
            .map(|i| product(&i.to_string(), "1", 10, true))
            .collect();
        products[0].tags = vec!["gadget".to_string()];
        let catalog = Catalog::new(vec![category("1", "books")], products).unwrap();

        assert_eq!(
            catalog.search_suggestions("PRODUCT").len(),
            SEARCH_SUGGESTION_LIMIT
        );
        assert!(catalog.search_suggestions("gadget").is_empty());
        assert!(catalog.search_suggestions("  ").is_empty());
    }

    #[test]
    fn test_featured_products_keep_catalog_order() {
        let mut a = product("1", "1", 10, true);
        let b = product("2", "1", 10, true);
        let mut c = product("3", "1", 10, true);
        a.featured = true;
        c.featured = true;
        let catalog = Catalog::new(vec![category("1", "books")], vec![a, b, c]).unwrap();

        let ids: Vec<&str> = catalog
            .featured_products()
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
    }
}
