//! Cart lines
//!
//! A [`CartLine`] is one product's presence in the cart. Lines are only ever
//! built from validated input: [`NewItem`] for items added by the shopper and
//! [`CartLine::try_from`] on a JSON entry for lines read back from storage.

use std::num::NonZeroU32;

use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::products::ProductId;

/// Reasons an add-to-cart payload is rejected.
#[derive(Debug, Error, PartialEq)]
pub enum ItemError {
    /// The payload carries no product id.
    #[error("item has no product id")]
    MissingProductId,

    /// Zero is never issued as a catalogue id.
    #[error("item has product id 0")]
    ZeroProductId,

    /// The payload carries no unit price.
    #[error("item {0} has no unit price")]
    MissingUnitPrice(ProductId),

    /// Unit prices cannot be negative.
    #[error("item {0} has negative unit price {1}")]
    NegativeUnitPrice(ProductId, Decimal),

    /// Original ("was") prices cannot be negative.
    #[error("item {0} has negative original price {1}")]
    NegativeOriginalPrice(ProductId, Decimal),

    /// A price that would change when written to storage as a JSON number.
    #[error("item {0} has price {1}, which cannot be stored exactly")]
    UnstorablePrice(ProductId, Decimal),
}

/// Reasons a persisted cart entry fails structural validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineError {
    /// The entry is not a JSON object.
    #[error("entry is not an object")]
    NotAnObject,

    /// `productId` is missing or not an integer.
    #[error("productId is missing or not an integer")]
    ProductId,

    /// `name` is missing or not a string.
    #[error("name is missing or not a string")]
    Name,

    /// `unitPrice` is missing, not a number, or negative.
    #[error("unitPrice is missing, not a number, or negative")]
    UnitPrice,

    /// `quantity` is missing or not a positive integer.
    #[error("quantity is missing or not a positive integer")]
    Quantity,

    /// `originalPrice` is present but not a non-negative number.
    #[error("originalPrice is not a non-negative number")]
    OriginalPrice,
}

/// Untyped add-to-cart payload, as handed over by a product card.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemInput {
    /// Catalogue id of the product.
    pub product_id: Option<i64>,

    /// Display name.
    pub name: String,

    /// Product image location.
    pub image_url: String,

    /// Catalogue category.
    pub category: String,

    /// Current price of one unit.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub unit_price: Option<Decimal>,

    /// Price before any markdown.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub original_price: Option<Decimal>,
}

impl ItemInput {
    /// Creates a payload for the given product, name and unit price.
    pub fn new(product_id: i64, name: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            product_id: Some(product_id),
            name: name.into(),
            unit_price: Some(unit_price),
            ..Self::default()
        }
    }

    /// Sets the image location.
    #[must_use]
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the original ("was") price.
    #[must_use]
    pub fn with_original_price(mut self, original_price: Decimal) -> Self {
        self.original_price = Some(original_price);
        self
    }
}

/// A product that passed validation and may be added to a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    product_id: ProductId,
    name: String,
    image_url: String,
    category: String,
    unit_price: Decimal,
    original_price: Option<Decimal>,
}

impl NewItem {
    /// The product this item refers to.
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Price of one unit.
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }
}

impl TryFrom<ItemInput> for NewItem {
    type Error = ItemError;

    fn try_from(input: ItemInput) -> Result<Self, Self::Error> {
        let product_id = match input.product_id {
            None => return Err(ItemError::MissingProductId),
            Some(0) => return Err(ItemError::ZeroProductId),
            Some(id) => ProductId::new(id),
        };

        let unit_price = input
            .unit_price
            .ok_or(ItemError::MissingUnitPrice(product_id))?;

        if unit_price.is_sign_negative() && !unit_price.is_zero() {
            return Err(ItemError::NegativeUnitPrice(product_id, unit_price));
        }

        if let Some(original) = input.original_price
            && original.is_sign_negative()
            && !original.is_zero()
        {
            return Err(ItemError::NegativeOriginalPrice(product_id, original));
        }

        for price in std::iter::once(unit_price).chain(input.original_price) {
            if !survives_storage(price) {
                return Err(ItemError::UnstorablePrice(product_id, price));
            }
        }

        Ok(Self {
            product_id,
            name: input.name,
            image_url: input.image_url,
            category: input.category,
            unit_price,
            original_price: input.original_price,
        })
    }
}

/// One product in the cart with its quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    product_id: ProductId,
    name: String,
    image_url: String,
    category: String,
    #[serde(with = "rust_decimal::serde::float")]
    unit_price: Decimal,
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    original_price: Option<Decimal>,
    quantity: NonZeroU32,
}

impl CartLine {
    /// Creates a line holding a single unit of `item`.
    pub fn new(item: NewItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name,
            image_url: item.image_url,
            category: item.category,
            unit_price: item.unit_price,
            original_price: item.original_price,
            quantity: NonZeroU32::MIN,
        }
    }

    /// The product on this line.
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Product image location.
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// Catalogue category.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Price of one unit, fixed when the line was first added.
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Price before any markdown, if the catalogue reported one.
    pub fn original_price(&self) -> Option<Decimal> {
        self.original_price
    }

    /// Number of units, always at least one.
    pub fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    /// Unit price multiplied by quantity.
    pub fn line_total(&self) -> Decimal {
        self.unit_price
            .saturating_mul(Decimal::from(self.quantity.get()))
    }

    /// Markdown saved on this line compared to the original price.
    pub fn savings(&self) -> Decimal {
        self.original_price
            .map(|original| original.saturating_sub(self.unit_price))
            .filter(|saved| saved.is_sign_positive() && !saved.is_zero())
            .map_or(Decimal::ZERO, |saved| {
                saved.saturating_mul(Decimal::from(self.quantity.get()))
            })
    }

    pub(crate) fn increment(&mut self) {
        self.quantity = self.quantity.saturating_add(1);
    }

    pub(crate) fn set_quantity(&mut self, quantity: NonZeroU32) {
        self.quantity = quantity;
    }
}

impl TryFrom<&Value> for CartLine {
    type Error = LineError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let entry = value.as_object().ok_or(LineError::NotAnObject)?;

        let product_id = entry
            .get("productId")
            .and_then(Value::as_i64)
            .map(ProductId::new)
            .ok_or(LineError::ProductId)?;

        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .ok_or(LineError::Name)?
            .to_string();

        let unit_price = entry
            .get("unitPrice")
            .and_then(price_from_json)
            .ok_or(LineError::UnitPrice)?;

        let quantity = entry
            .get("quantity")
            .and_then(Value::as_u64)
            .and_then(|quantity| u32::try_from(quantity).ok())
            .and_then(NonZeroU32::new)
            .ok_or(LineError::Quantity)?;

        let original_price = match entry.get("originalPrice") {
            None | Some(Value::Null) => None,
            Some(price) => Some(price_from_json(price).ok_or(LineError::OriginalPrice)?),
        };

        Ok(Self {
            product_id,
            name,
            image_url: text_or_empty(entry, "imageUrl"),
            category: text_or_empty(entry, "category"),
            unit_price,
            original_price,
            quantity,
        })
    }
}

/// Prices are persisted as `f64`; only values that read back unchanged are accepted.
fn survives_storage(price: Decimal) -> bool {
    price
        .to_f64()
        .and_then(Decimal::from_f64)
        .is_some_and(|stored| stored == price)
}

fn price_from_json(value: &Value) -> Option<Decimal> {
    value
        .as_f64()
        .and_then(Decimal::from_f64)
        .filter(|price| !price.is_sign_negative() || price.is_zero())
}

fn text_or_empty(entry: &Map<String, Value>, field: &str) -> String {
    entry
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
