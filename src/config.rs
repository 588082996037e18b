//! Configuration
//!
//! Cart settings, optionally loaded from a YAML file:
//!
//! ```yaml
//! storage_key: cart
//! currency: USD
//! tax_rate: 8%
//! free_shipping_over: 50.00 USD
//! shipping_fee: 5.99 USD
//! member_discount: 10%
//! charge_shipping_when_empty: false
//! ```
//!
//! Every key is optional.

use std::{fs, path::Path};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::iso::{self, Currency};
use serde::Deserialize;
use thiserror::Error;

use crate::{pricing::PricingPolicy, store::is_valid_key};

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "cart";

/// Configuration Errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A price is written in a different currency from the cart
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// The storage key cannot be used as a store key
    #[error("Invalid storage key {0:?}: use ASCII letters, digits, '-', '_' or '.'")]
    InvalidStorageKey(String),
}

/// Cart settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CartConfig {
    /// Key the cart is persisted under.
    pub storage_key: String,

    /// Currency all prices are quoted in.
    pub currency: &'static Currency,

    /// Tax, shipping and discount rules.
    pub pricing: PricingPolicy,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            currency: iso::USD,
            pricing: PricingPolicy::default(),
        }
    }
}

/// On-disk shape of [`CartConfig`].
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CartConfigFile {
    storage_key: Option<String>,
    currency: Option<String>,
    tax_rate: Option<String>,
    free_shipping_over: Option<String>,
    shipping_fee: Option<String>,
    member_discount: Option<String>,
    charge_shipping_when_empty: Option<bool>,
}

impl CartConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or holds invalid values.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Load configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be parsed or holds invalid values.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let file: CartConfigFile = serde_norway::from_str(yaml)?;

        file.try_into()
    }
}

impl TryFrom<CartConfigFile> for CartConfig {
    type Error = ConfigError;

    fn try_from(file: CartConfigFile) -> Result<Self, Self::Error> {
        let defaults = Self::default();

        let currency = match file.currency.as_deref() {
            Some(code) => parse_currency(code)?,
            None => defaults.currency,
        };

        let storage_key = file.storage_key.unwrap_or(defaults.storage_key);

        if !is_valid_key(&storage_key) {
            return Err(ConfigError::InvalidStorageKey(storage_key));
        }

        let price_in = |s: &str| -> Result<Decimal, ConfigError> {
            let (amount, price_currency) = parse_price(s)?;

            if price_currency == currency {
                Ok(amount)
            } else {
                Err(ConfigError::CurrencyMismatch(
                    currency.iso_alpha_code.to_string(),
                    price_currency.iso_alpha_code.to_string(),
                ))
            }
        };

        let mut pricing = defaults.pricing;

        if let Some(rate) = file.tax_rate.as_deref() {
            pricing.tax_rate = parse_percentage(rate)?;
        }

        if let Some(threshold) = file.free_shipping_over.as_deref() {
            pricing.free_shipping_threshold = price_in(threshold)?;
        }

        if let Some(fee) = file.shipping_fee.as_deref() {
            pricing.shipping_fee = price_in(fee)?;
        }

        if let Some(discount) = file.member_discount.as_deref() {
            pricing.member_discount = Some(parse_percentage(discount)?);
        }

        if let Some(charge) = file.charge_shipping_when_empty {
            pricing.charge_shipping_when_empty = charge;
        }

        Ok(Self {
            storage_key,
            currency,
            pricing,
        })
    }
}

fn parse_currency(code: &str) -> Result<&'static Currency, ConfigError> {
    iso::find(code.trim()).ok_or_else(|| ConfigError::UnknownCurrency(code.to_string()))
}

/// Parse a price string like "5.99 USD".
///
/// # Errors
///
/// Returns an error if the format is not `AMOUNT CURRENCY`, the amount is not a
/// non-negative decimal, or the currency code is unknown.
pub fn parse_price(s: &str) -> Result<(Decimal, &'static Currency), ConfigError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, code] = parts.as_slice() else {
        return Err(ConfigError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| ConfigError::InvalidPrice(s.to_string()))?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ConfigError::InvalidPrice(s.to_string()));
    }

    Ok((amount, parse_currency(code)?))
}

/// Parse a percentage string like "8%" or "0.08".
///
/// # Errors
///
/// Returns an error if the string is not a number between 0 and 100%.
pub fn parse_percentage(s: &str) -> Result<Percentage, ConfigError> {
    let trimmed = s.trim();

    let parsed = if let Some(percent_str) = trimmed.strip_suffix('%') {
        percent_str
            .trim()
            .parse::<Decimal>()
            .map(|points| points / Decimal::ONE_HUNDRED)
    } else {
        trimmed.parse::<Decimal>()
    };

    let fraction = parsed.map_err(|_err| ConfigError::InvalidPercentage(s.to_string()))?;

    if !(Decimal::ZERO..=Decimal::ONE).contains(&fraction) {
        return Err(ConfigError::InvalidPercentage(s.to_string()));
    }

    Ok(Percentage::from(fraction))
}
