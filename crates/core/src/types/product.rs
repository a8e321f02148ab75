//! Catalog entities: products and categories.

use std::collections::{BTreeMap, HashSet};

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId};
use super::slug::Slug;

/// Highest rating a product can carry.
pub const MAX_RATING: f64 = 5.0;

/// Validation failures for a single [`Product`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ProductError {
    #[error("product name cannot be empty")]
    EmptyName,
    #[error("price cannot be negative (got {0})")]
    NegativePrice(Decimal),
    #[error("original price {original} is below price {price}")]
    OriginalPriceBelowPrice { price: Decimal, original: Decimal },
    #[error("product must have at least one image")]
    NoImages,
    #[error("rating must be between 0 and 5 (got {0})")]
    RatingOutOfRange(f64),
    #[error("duplicate tag: {0}")]
    DuplicateTag(String),
}

/// A browsable product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: Slug,
    #[serde(default)]
    pub description: String,
    /// Image reference (URL or asset path).
    #[serde(default)]
    pub image: String,
}

/// A product in the catalog.
///
/// Products are loaded once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    /// Pre-discount price, shown struck through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    pub images: Vec<String>,
    pub category_id: CategoryId,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u32,
    pub in_stock: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Specification name to value (e.g. "Battery Life" -> "40 hours").
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
}

impl Product {
    /// Check the per-product invariants.
    ///
    /// # Errors
    ///
    /// Returns the first [`ProductError`] found.
    pub fn validate(&self) -> Result<(), ProductError> {
        if self.name.trim().is_empty() {
            return Err(ProductError::EmptyName);
        }

        if self.price < Decimal::ZERO {
            return Err(ProductError::NegativePrice(self.price));
        }

        if let Some(original) = self.original_price
            && original < self.price
        {
            return Err(ProductError::OriginalPriceBelowPrice {
                price: self.price,
                original,
            });
        }

        if self.images.is_empty() {
            return Err(ProductError::NoImages);
        }

        if !(0.0..=MAX_RATING).contains(&self.rating) {
            return Err(ProductError::RatingOutOfRange(self.rating));
        }

        let mut seen = HashSet::new();
        for tag in &self.tags {
            if !seen.insert(tag.to_lowercase()) {
                return Err(ProductError::DuplicateTag(tag.clone()));
            }
        }

        Ok(())
    }

    /// Percentage saved against the original price, rounded to a whole number.
    ///
    /// Returns `None` when there is no original price or it is zero.
    #[must_use]
    pub fn discount_percentage(&self) -> Option<u32> {
        let original = self.original_price?;
        if original.is_zero() {
            return None;
        }
        let pct = ((original - self.price) / original * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        pct.to_u32()
    }

    /// Case-insensitive match against name, description or any tag.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches_text(&self, needle: &str) -> bool {
        self.matches_name_or_description(needle)
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(needle))
    }

    /// Case-insensitive match against name or description only.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches_name_or_description(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            id: ProductId::new("1"),
            name: "Ethereal Wireless Headphones".to_string(),
            description: "Noise cancellation and 40-hour battery".to_string(),
            price: Decimal::new(29999, 2),
            original_price: Some(Decimal::new(39999, 2)),
            images: vec!["/img/headphones.png".to_string()],
            category_id: CategoryId::new("1"),
            rating: 4.8,
            review_count: 2847,
            in_stock: true,
            featured: true,
            tags: vec!["wireless".to_string(), "Premium".to_string()],
            specifications: BTreeMap::new(),
        }
    }

    #[test]
    fn test_valid_product() {
        assert!(product().validate().is_ok());
    }

    #[test]
    fn test_original_price_below_price() {
        let mut p = product();
        p.original_price = Some(Decimal::new(100, 0));
        assert!(matches!(
            p.validate(),
            Err(ProductError::OriginalPriceBelowPrice { .. })
        ));
    }

    #[test]
    fn test_negative_price() {
        let mut p = product();
        p.price = Decimal::new(-1, 0);
        p.original_price = None;
        assert!(matches!(p.validate(), Err(ProductError::NegativePrice(_))));
    }

    #[test]
    fn test_no_images() {
        let mut p = product();
        p.images.clear();
        assert_eq!(p.validate(), Err(ProductError::NoImages));
    }

    #[test]
    fn test_rating_out_of_range() {
        let mut p = product();
        p.rating = 5.1;
        assert!(matches!(
            p.validate(),
            Err(ProductError::RatingOutOfRange(_))
        ));
    }

    #[test]
    fn test_duplicate_tag_is_case_insensitive() {
        let mut p = product();
        p.tags.push("WIRELESS".to_string());
        assert!(matches!(p.validate(), Err(ProductError::DuplicateTag(_))));
    }

    #[test]
    fn test_discount_percentage() {
        // (399.99 - 299.99) / 399.99 = 25.0%
        assert_eq!(product().discount_percentage(), Some(25));

        let mut p = product();
        p.original_price = None;
        assert_eq!(p.discount_percentage(), None);
    }

    #[test]
    fn test_matches_text_checks_tags() {
        let p = product();
        assert!(p.matches_text("premium"));
        assert!(p.matches_text("headphones"));
        assert!(p.matches_text("battery"));
        assert!(!p.matches_text("silk"));
        assert!(!p.matches_name_or_description("premium"));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "id": "7",
            "name": "Lamp",
            "price": "149.99",
            "images": ["/img/lamp.png"],
            "categoryId": "3",
            "inStock": false,
            "reviewCount": 12
        }"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.price, Decimal::new(14999, 2));
        assert!(!p.in_stock);
        assert!(!p.featured);
        assert_eq!(p.review_count, 12);
        assert!(p.original_price.is_none());
    }
}
