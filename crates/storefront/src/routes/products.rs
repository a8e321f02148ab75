//! Product route handlers.
//!
//! Listing, detail, featured, related and autocomplete endpoints over the
//! read-only catalog. All responses are JSON.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use ethereal_cart_core::{Product, ProductFilter, SortKey};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Product with derived display fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<u32>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            discount_percentage: product.discount_percentage(),
            product: product.clone(),
        }
    }
}

/// Product listing response.
#[derive(Debug, Serialize)]
pub struct ProductList {
    pub products: Vec<ProductView>,
    pub total: usize,
}

impl ProductList {
    /// Build a listing from borrowed catalog products.
    #[must_use]
    pub fn from_products(products: &[&Product]) -> Self {
        Self {
            total: products.len(),
            products: products.iter().map(|p| ProductView::from(*p)).collect(),
        }
    }
}

/// Product listing query parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock: Option<bool>,
    pub sort: Option<SortKey>,
}

impl ProductQuery {
    fn into_parts(self) -> (ProductFilter, SortKey) {
        let filter = ProductFilter {
            category: self.category,
            search: self.search,
            min_price: self.min_price,
            max_price: self.max_price,
            in_stock: self.in_stock,
        };
        (filter, self.sort.unwrap_or_default())
    }
}

/// Search suggestion query parameters.
#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub q: String,
}

/// Filtered and sorted product listing.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductList>> {
    let (filter, sort) = query.into_parts();
    if let (Some(min), Some(max)) = (filter.min_price, filter.max_price)
        && min > max
    {
        return Err(AppError::BadRequest(format!(
            "minPrice {min} is greater than maxPrice {max}"
        )));
    }

    state.latency().simulate().await;
    let products = state.catalog().query(&filter, sort);
    tracing::debug!(count = products.len(), %sort, "Listed products");

    Ok(Json(ProductList::from_products(&products)))
}

/// Featured products in catalog order.
#[instrument(skip(state))]
pub async fn featured(State(state): State<AppState>) -> Json<ProductList> {
    state.latency().simulate().await;
    Json(ProductList::from_products(&state.catalog().featured_products()))
}

/// Autocomplete suggestions for the search box.
#[instrument(skip(state))]
pub async fn suggestions(
    State(state): State<AppState>,
    Query(query): Query<SuggestionQuery>,
) -> Json<ProductList> {
    state.latency().simulate().await;
    Json(ProductList::from_products(&state.catalog().search_suggestions(&query.q)))
}

/// Single product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductView>> {
    state.latency().simulate().await;
    state
        .catalog()
        .product(&id)
        .map(|p| Json(ProductView::from(p)))
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// Products in the same category as `id`; empty for an unknown id.
#[instrument(skip(state))]
pub async fn related(State(state): State<AppState>, Path(id): Path<String>) -> Json<ProductList> {
    state.latency().simulate().await;
    Json(ProductList::from_products(&state.catalog().related_products(&id)))
}
