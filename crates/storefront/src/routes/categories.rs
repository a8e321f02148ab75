//! Category route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use ethereal_cart_core::{Category, ProductFilter};

use super::products::ProductList;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Category with its product count.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    #[serde(flatten)]
    pub category: Category,
    pub product_count: usize,
}

/// Category detail with its products.
#[derive(Debug, Serialize)]
pub struct CategoryDetail {
    pub category: Category,
    #[serde(flatten)]
    pub products: ProductList,
}

/// All categories in catalog order.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Json<Vec<CategorySummary>> {
    state.latency().simulate().await;
    let catalog = state.catalog();
    let summaries = catalog
        .categories()
        .iter()
        .map(|category| CategorySummary {
            product_count: catalog
                .products()
                .iter()
                .filter(|p| p.category_id == category.id)
                .count(),
            category: category.clone(),
        })
        .collect();
    Json(summaries)
}

/// A category by slug, with its products.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CategoryDetail>> {
    state.latency().simulate().await;
    let catalog = state.catalog();
    let category = catalog
        .category_by_slug(&slug)
        .ok_or_else(|| AppError::NotFound(format!("category {slug}")))?;
    let products = catalog.list_products(&ProductFilter::default().category(slug.as_str()));

    Ok(Json(CategoryDetail {
        category: category.clone(),
        products: ProductList::from_products(&products),
    }))
}
