//! Utils

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

/// Arguments for the cart example
#[derive(Debug, Parser)]
#[command(name = "cart", about = "Inspect and edit a file-backed storefront cart")]
pub struct CartArgs {
    /// Directory the cart is stored in
    #[arg(short, long, default_value = "target/cart-store")]
    pub store: PathBuf,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    pub log_level: String,

    /// Action to apply before printing the cart
    #[command(subcommand)]
    pub action: Option<CartAction>,
}

/// Cart actions available from the command line
#[derive(Debug, Subcommand)]
pub enum CartAction {
    /// Add one unit of a product
    Add {
        /// Product id
        #[arg(long)]
        id: i64,

        /// Product name
        #[arg(long)]
        name: String,

        /// Unit price, e.g. 19.99
        #[arg(long)]
        price: Decimal,

        /// Price before markdown
        #[arg(long)]
        was: Option<Decimal>,

        /// Product category
        #[arg(long, default_value = "")]
        category: String,
    },

    /// Remove a product's line
    Remove {
        /// Product id
        id: i64,
    },

    /// Set a product's quantity; zero or less removes it
    Update {
        /// Product id
        id: i64,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Empty the cart
    Clear,

    /// Flip the drawer flag
    Toggle,

    /// Print the cart without changing it
    Show,
}
