//! File-backed Cart Example
//!
//! Opens the cart stored under `--store`, applies one action and prints the result.
//!
//! ```text
//! cargo run --example cart -- add --id 1 --name "Desk Lamp" --price 60
//! cargo run --example cart -- update 1 3
//! cargo run --example cart -- show
//! ```

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use storefront_cart::{
    config::CartConfig,
    lines::ItemInput,
    products::ProductId,
    session::CartSession,
    store::FileStore,
    summary::write_summary,
    utils::{CartAction, CartArgs},
};

/// File-backed Cart Example
pub fn main() -> Result<()> {
    let args = CartArgs::parse();

    tracing_subscriber::fmt()
        .compact()
        .with_target(true)
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))?;

    let config = match args.config.as_deref() {
        Some(path) => CartConfig::from_file(path)?,
        None => CartConfig::default(),
    };

    let mut session = CartSession::open(FileStore::new(&args.store), &config);

    let warning = match args.action {
        Some(CartAction::Add {
            id,
            name,
            price,
            was,
            category,
        }) => {
            let mut input = ItemInput::new(id, name, price).with_category(category);
            input.original_price = was;

            session.add_item(input)
        }
        Some(CartAction::Remove { id }) => session.remove_item(ProductId::new(id)),
        Some(CartAction::Update { id, quantity }) => {
            session.update_quantity(ProductId::new(id), quantity)
        }
        Some(CartAction::Clear) => session.clear(),
        Some(CartAction::Toggle) => session.toggle_open(),
        Some(CartAction::Show) | None => None,
    };

    if let Some(warning) = warning {
        tracing::warn!(%warning, "cart action incomplete");
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    write_summary(&mut handle, session.state(), config.currency)?;

    Ok(())
}
