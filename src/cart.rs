//! Cart
//!
//! The cart state machine. [`CartState::apply`] is the only way to change a
//! cart; every transition finishes by recomputing the derived [`Totals`], so
//! readers never see totals that disagree with the lines.

use std::num::NonZeroU32;

use serde::Serialize;

use crate::{
    lines::{CartLine, NewItem},
    pricing::{PricingPolicy, Totals, calculate_totals},
    products::ProductId,
};

/// A transition of the cart state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum CartCommand {
    /// Add one unit of a product. An existing line keeps its first-seen price.
    AddItem(NewItem),

    /// Drop the line for a product.
    RemoveItem(ProductId),

    /// Set a line's quantity; anything at or below zero removes the line.
    UpdateQuantity {
        /// Line to update.
        product_id: ProductId,
        /// Requested quantity.
        quantity: i64,
    },

    /// Reset to the empty cart.
    ClearCart,

    /// Flip the drawer visibility flag.
    ToggleOpen,

    /// Hide the drawer.
    CloseOpen,

    /// Replace the lines with ones read back from storage.
    LoadCart(Vec<CartLine>),
}

/// Shopping cart contents plus derived totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartState {
    lines: Vec<CartLine>,
    is_open: bool,
    #[serde(flatten)]
    totals: Totals,
    #[serde(skip)]
    policy: PricingPolicy,
}

impl Default for CartState {
    fn default() -> Self {
        Self::new(PricingPolicy::default())
    }
}

impl CartState {
    /// Creates an empty, closed cart priced with `policy`.
    pub fn new(policy: PricingPolicy) -> Self {
        Self {
            lines: Vec::new(),
            is_open: false,
            totals: calculate_totals(&[], &policy),
            policy,
        }
    }

    /// Applies a command and recomputes the totals.
    pub fn apply(&mut self, command: CartCommand) {
        match command {
            CartCommand::AddItem(item) => self.add_item(item),
            CartCommand::RemoveItem(product_id) => self.remove_item(product_id),
            CartCommand::UpdateQuantity {
                product_id,
                quantity,
            } => self.update_quantity(product_id, quantity),
            CartCommand::ClearCart => {
                *self = Self::new(self.policy);
                return;
            }
            CartCommand::ToggleOpen => self.is_open = !self.is_open,
            CartCommand::CloseOpen => self.is_open = false,
            CartCommand::LoadCart(lines) => self.load(lines),
        }

        self.totals = calculate_totals(&self.lines, &self.policy);
    }

    fn add_item(&mut self, item: NewItem) {
        match self.line_mut(item.product_id()) {
            Some(line) => line.increment(),
            None => self.lines.push(CartLine::new(item)),
        }
    }

    fn remove_item(&mut self, product_id: ProductId) {
        self.lines.retain(|line| line.product_id() != product_id);
    }

    fn update_quantity(&mut self, product_id: ProductId, quantity: i64) {
        let quantity = u32::try_from(quantity.max(0)).unwrap_or(u32::MAX);

        match NonZeroU32::new(quantity) {
            Some(quantity) => {
                if let Some(line) = self.line_mut(product_id) {
                    line.set_quantity(quantity);
                }
            }
            None => self.remove_item(product_id),
        }
    }

    fn load(&mut self, lines: Vec<CartLine>) {
        self.lines.clear();

        for line in lines {
            if self.line(line.product_id()).is_none() {
                self.lines.push(line);
            }
        }
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id() == product_id)
    }

    /// Looks up the line for a product.
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|line| line.product_id() == product_id)
    }

    /// Lines in the order they were first added.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart drawer is showing.
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Derived totals for the current lines.
    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// The pricing rules this cart is quoted with.
    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// Number of units across all lines, as shown on the header badge.
    pub fn total_item_count(&self) -> u64 {
        self.totals.total_item_count
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
