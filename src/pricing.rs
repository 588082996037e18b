//! Pricing
//!
//! Derived cart totals. [`calculate_totals`] is a pure function of the cart
//! lines and a [`PricingPolicy`]; nothing else feeds into the figures.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::lines::CartLine;

/// Tax, shipping and discount rules applied to every cart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingPolicy {
    /// Sales tax charged on the discounted subtotal.
    pub tax_rate: Percentage,

    /// Subtotals strictly above this amount ship for free.
    pub free_shipping_threshold: Decimal,

    /// Flat shipping fee charged at or below the threshold.
    pub shipping_fee: Decimal,

    /// Member discount taken off the subtotal before tax.
    pub member_discount: Option<Percentage>,

    /// Whether an empty cart is still quoted the flat shipping fee.
    pub charge_shipping_when_empty: bool,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            tax_rate: Percentage::from(Decimal::new(8, 2)),
            free_shipping_threshold: Decimal::from(50),
            shipping_fee: Decimal::new(599, 2),
            member_discount: None,
            charge_shipping_when_empty: false,
        }
    }
}

/// Figures derived from the cart lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Sum of all line quantities.
    pub total_item_count: u64,

    /// Sum of unit price times quantity.
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,

    /// Member discount taken off the subtotal.
    #[serde(with = "rust_decimal::serde::float")]
    pub discount: Decimal,

    /// Markdowns relative to original prices; informational only.
    #[serde(with = "rust_decimal::serde::float")]
    pub savings: Decimal,

    /// Tax on the discounted subtotal.
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,

    /// Shipping charge.
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping: Decimal,

    /// Amount payable.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl Totals {
    /// Whether shipping is waived for these totals.
    pub fn free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }
}

/// Calculates the derived totals for a set of cart lines.
pub fn calculate_totals(lines: &[CartLine], policy: &PricingPolicy) -> Totals {
    let total_item_count = lines
        .iter()
        .map(|line| u64::from(line.quantity()))
        .fold(0_u64, u64::saturating_add);

    let subtotal = lines
        .iter()
        .map(CartLine::line_total)
        .fold(Decimal::ZERO, Decimal::saturating_add);

    let savings = lines
        .iter()
        .map(CartLine::savings)
        .fold(Decimal::ZERO, Decimal::saturating_add);

    let discount = policy
        .member_discount
        .map_or(Decimal::ZERO, |rate| rate * subtotal);

    let taxable = subtotal.saturating_sub(discount);
    let tax = policy.tax_rate * taxable;

    let nothing_to_ship = lines.is_empty() && !policy.charge_shipping_when_empty;

    let shipping = if nothing_to_ship || subtotal > policy.free_shipping_threshold {
        Decimal::ZERO
    } else {
        policy.shipping_fee
    };

    Totals {
        total_item_count,
        subtotal,
        discount,
        savings,
        tax,
        shipping,
        total: taxable.saturating_add(tax).saturating_add(shipping),
    }
}
