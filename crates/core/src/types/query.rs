//! Catalog query parameters: filters and sort keys.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product listing filter.
///
/// Every field is optional; an empty filter matches the whole catalog.
/// Field names follow the storefront query string (`minPrice`, `inStock`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    /// Category slug to match exactly.
    #[serde(default)]
    pub category: Option<String>,
    /// Free-text search over name, description and tags.
    #[serde(default)]
    pub search: Option<String>,
    /// Inclusive lower price bound.
    #[serde(default)]
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    #[serde(default)]
    pub max_price: Option<Decimal>,
    /// Stock availability to match exactly.
    #[serde(default)]
    pub in_stock: Option<bool>,
}

impl ProductFilter {
    /// Restrict to a category slug.
    #[must_use]
    pub fn category(mut self, slug: impl Into<String>) -> Self {
        self.category = Some(slug.into());
        self
    }

    /// Add a free-text search term.
    #[must_use]
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    /// Restrict to an inclusive price range; either bound may be open.
    #[must_use]
    pub const fn price_between(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    /// Restrict by stock availability.
    #[must_use]
    pub const fn in_stock(mut self, in_stock: bool) -> Self {
        self.in_stock = Some(in_stock);
        self
    }

    /// The search term lowercased, or `None` when absent or blank.
    #[must_use]
    pub fn search_needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// The category slug, or `None` when absent or blank.
    #[must_use]
    pub fn category_slug(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Product listing order.
///
/// Wire names match the storefront's sort selector values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Featured products first, catalog order otherwise.
    #[default]
    Featured,
    /// Cheapest first.
    PriceLow,
    /// Most expensive first.
    PriceHigh,
    /// Highest rated first.
    Rating,
    /// Highest id first (ids are assigned in creation order).
    Newest,
}

impl SortKey {
    /// Wire name of the sort key.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Rating => "rating",
            Self::Newest => "newest",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "featured" => Ok(Self::Featured),
            "price-low" => Ok(Self::PriceLow),
            "price-high" => Ok(Self::PriceHigh),
            "rating" => Ok(Self::Rating),
            "newest" => Ok(Self::Newest),
            _ => Err(format!("invalid sort key: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_search_needle_normalizes() {
        let filter = ProductFilter::default().search("  Ethereal ");
        assert_eq!(filter.search_needle().as_deref(), Some("ethereal"));

        let blank = ProductFilter::default().search("   ");
        assert_eq!(blank.search_needle(), None);
    }

    #[test]
    fn test_blank_category_is_ignored() {
        let filter = ProductFilter::default().category("");
        assert_eq!(filter.category_slug(), None);
    }

    #[test]
    fn test_filter_deserializes_camel_case() {
        let filter: ProductFilter =
            serde_json::from_str(r#"{"minPrice":"10","maxPrice":"50","inStock":true}"#).unwrap();
        assert_eq!(filter.min_price, Some(Decimal::new(10, 0)));
        assert_eq!(filter.max_price, Some(Decimal::new(50, 0)));
        assert_eq!(filter.in_stock, Some(true));
        assert_eq!(filter.category, None);
    }

    #[test]
    fn test_sort_key_round_trips_through_str() {
        for key in [
            SortKey::Featured,
            SortKey::PriceLow,
            SortKey::PriceHigh,
            SortKey::Rating,
            SortKey::Newest,
        ] {
            assert_eq!(key.as_str().parse::<SortKey>().unwrap(), key);
        }
        assert!("cheapest".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_sort_key_serde_matches_as_str() {
        let json = serde_json::to_string(&SortKey::PriceHigh).unwrap();
        assert_eq!(json, "\"price-high\"");
    }
}
