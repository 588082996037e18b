//! Summary
//!
//! Terminal rendering of a cart: one table row per line, followed by the
//! derived totals.

use std::io;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{cart::CartState, lines::CartLine};

/// Errors that can occur while writing a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// The output could not be written.
    #[error("failed to write cart summary: {0}")]
    Io(#[from] io::Error),
}

/// Formats an amount in `currency`, rounded to the currency's minor unit.
pub fn format_amount(amount: Decimal, currency: &Currency) -> String {
    Money::from_decimal(amount.round_dp(currency.exponent), currency).to_string()
}

/// Writes the cart lines and totals as a table.
///
/// # Errors
///
/// Returns a [`SummaryError`] if writing to `out` fails.
pub fn write_summary(
    mut out: impl io::Write,
    state: &CartState,
    currency: &Currency,
) -> Result<(), SummaryError> {
    if state.is_empty() {
        writeln!(out, "\nYour cart is empty.\n")?;
    } else {
        let mut builder = Builder::default();

        builder.push_record(["#", "Product", "Category", "Qty", "Unit", "Line total"]);

        for (idx, line) in state.lines().iter().enumerate() {
            builder.push_record(line_record(idx, line, currency));
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::new(3..6), Alignment::right());
        table.modify(Rows::first(), Alignment::center());

        writeln!(out, "\n{table}")?;
    }

    for (label, value) in summary_rows(state, currency) {
        writeln!(out, " {label:<10} {value:>14}")?;
    }

    writeln!(out)?;

    Ok(())
}

fn line_record(idx: usize, line: &CartLine, currency: &Currency) -> [String; 6] {
    let unit = match line.original_price() {
        Some(original) if original > line.unit_price() => format!(
            "{} (was {})",
            format_amount(line.unit_price(), currency),
            format_amount(original, currency)
        ),
        _ => format_amount(line.unit_price(), currency),
    };

    [
        format!("{:<3}", idx + 1),
        line.name().to_string(),
        line.category().to_string(),
        line.quantity().to_string(),
        unit,
        format_amount(line.line_total(), currency),
    ]
}

fn summary_rows(state: &CartState, currency: &Currency) -> Vec<(&'static str, String)> {
    let totals = state.totals();
    let mut rows = vec![
        ("Items:", totals.total_item_count.to_string()),
        ("Subtotal:", format_amount(totals.subtotal, currency)),
    ];

    if !totals.savings.is_zero() {
        rows.push(("Savings:", format!("-{}", format_amount(totals.savings, currency))));
    }

    if !totals.discount.is_zero() {
        rows.push(("Discount:", format!("-{}", format_amount(totals.discount, currency))));
    }

    rows.push(("Tax:", format_amount(totals.tax, currency)));

    let shipping = if totals.free_shipping() {
        "Free".to_string()
    } else {
        format_amount(totals.shipping, currency)
    };

    rows.push(("Shipping:", shipping));
    rows.push(("Total:", format_amount(totals.total, currency)));

    rows
}
