//! # Furrow
//!
//! Headless runner for the Furrow tile farming simulation.
//!
//! Ties together the workspace crates:
//! - World: grid generation, tile transitions, crop growth
//! - Gameplay: actor, item drops, tool interaction, per-tick simulation
//!
//! Usage: `furrow [CONFIG]`, where `CONFIG` defaults to `furrow.toml`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;
mod farmhand;
mod timing;

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("furrow=info".parse()?))
        .init();

    info!("Furrow starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    app::run(config_path.as_deref())?;

    info!("Furrow shutdown complete");
    Ok(())
}
