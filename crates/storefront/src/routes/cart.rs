//! Cart route handlers.
//!
//! Every mutation responds with the resolved cart and its order totals so
//! clients can re-render without a second request.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use ethereal_cart_core::{CartLine, ProductId};

use crate::error::{Result, add_breadcrumb};
use crate::services::CartError;
use crate::services::cart::CartView;
use crate::state::AppState;

/// Add to cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    /// Defaults to 1. Values outside `1..=u32::MAX` are rejected as
    /// invalid quantities.
    pub quantity: Option<i64>,
}

/// Update cart request body. A quantity of zero or less removes the line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Remove from cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartRequest {
    pub product_id: ProductId,
}

/// Cart count badge.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u64,
}

fn view_of(state: &AppState, lines: &[CartLine]) -> Json<CartView> {
    Json(CartView::build(lines, state.catalog(), state.cart().pricing()))
}

/// Current cart with totals.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Json<CartView> {
    Json(state.cart().view().await)
}

/// Add an item to the cart.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    Json(body): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let requested = body.quantity.unwrap_or(1);
    let quantity = u32::try_from(requested).map_err(|_| {
        CartError::InvalidQuantity(format!("cannot add {requested} of a product"))
    })?;
    let lines = state.cart().add_to_cart(&body.product_id, quantity).await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        &[
            ("product_id", body.product_id.as_str()),
            ("quantity", &quantity.to_string()),
        ],
    );
    Ok(view_of(&state, &lines))
}

/// Set an item's quantity.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Json(body): Json<UpdateCartRequest>,
) -> Result<Json<CartView>> {
    let lines = state
        .cart()
        .update_cart_item(&body.product_id, body.quantity)
        .await?;
    Ok(view_of(&state, &lines))
}

/// Remove an item from the cart.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Json(body): Json<RemoveFromCartRequest>,
) -> Result<Json<CartView>> {
    let lines = state.cart().remove_from_cart(&body.product_id).await?;
    Ok(view_of(&state, &lines))
}

/// Empty the cart.
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> Result<Json<CartView>> {
    let lines = state.cart().clear_cart().await?;
    Ok(view_of(&state, &lines))
}

/// Total item quantity for the cart badge.
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> Json<CartCount> {
    Json(CartCount {
        count: state.cart().item_count().await,
    })
}
