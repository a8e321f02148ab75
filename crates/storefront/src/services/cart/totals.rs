//! Order totals and the resolved cart view.

use rust_decimal::Decimal;
use serde::Serialize;

use ethereal_cart_core::{CartLine, CurrencyCode, Price, Product, round_money};

use crate::config::PricingConfig;
use crate::services::catalog::Catalog;

/// A cart line joined with its catalog product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
    /// `price * quantity`, unrounded
    pub line_total: Decimal,
}

/// Derived order amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub item_count: u64,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub free_shipping: bool,
    /// Amount still needed to qualify for free shipping
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_shipping_remaining: Option<Decimal>,
    pub currency_code: CurrencyCode,
}

impl OrderTotals {
    /// Totals for an empty cart: everything zero, no shipping charged.
    #[must_use]
    pub const fn empty(currency_code: CurrencyCode) -> Self {
        Self {
            item_count: 0,
            subtotal: Decimal::ZERO,
            shipping: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::ZERO,
            free_shipping: false,
            free_shipping_remaining: None,
            currency_code,
        }
    }

    /// Grand total with its currency.
    #[must_use]
    pub const fn total_price(&self) -> Price {
        Price::new(self.total, self.currency_code)
    }

    /// Compute totals over resolved cart items.
    ///
    /// Shipping is free when the subtotal is strictly greater than the
    /// threshold, otherwise the flat fee applies. Tax is the subtotal times
    /// the tax rate, rounded to cents.
    #[must_use]
    pub fn compute(items: &[CartItem], pricing: &PricingConfig) -> Self {
        if items.is_empty() {
            return Self::empty(pricing.currency);
        }

        let subtotal: Decimal = items.iter().map(|item| item.line_total).sum();
        let item_count = items.iter().map(|item| u64::from(item.quantity)).sum();

        let free_shipping = subtotal > pricing.free_shipping_threshold;
        let shipping = if free_shipping {
            Decimal::ZERO
        } else {
            pricing.flat_shipping_fee
        };
        let free_shipping_remaining = (subtotal < pricing.free_shipping_threshold)
            .then(|| pricing.free_shipping_threshold - subtotal);
        let tax = round_money(subtotal * pricing.tax_rate);

        Self {
            item_count,
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
            free_shipping,
            free_shipping_remaining,
            currency_code: pricing.currency,
        }
    }
}

/// The cart as shown to a shopper.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub totals: OrderTotals,
}

impl CartView {
    /// Join lines with the catalog and compute totals.
    ///
    /// Lines whose product no longer resolves are skipped and logged.
    #[must_use]
    pub fn build(lines: &[CartLine], catalog: &Catalog, pricing: &PricingConfig) -> Self {
        let items = resolve_items(lines, catalog);
        let totals = OrderTotals::compute(&items, pricing);
        Self { items, totals }
    }
}

fn resolve_items(lines: &[CartLine], catalog: &Catalog) -> Vec<CartItem> {
    lines
        .iter()
        .filter_map(|line| {
            let Some(product) = catalog.product(line.product_id.as_str()) else {
                tracing::warn!(
                    product_id = %line.product_id,
                    "Cart line references unknown product"
                );
                return None;
            };
            Some(CartItem {
                product: product.clone(),
                quantity: line.quantity,
                line_total: product.price * Decimal::from(line.quantity),
            })
        })
        .collect()
}
