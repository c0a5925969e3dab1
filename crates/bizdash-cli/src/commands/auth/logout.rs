//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;

use bizdash_core::CredentialStore;

use crate::output;
use crate::session::{Settings, storage};

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub fn run(_args: LogoutArgs, settings: &Settings) -> Result<()> {
    let store = storage::open_store(settings)?;
    store.clear().context("Failed to remove session")?;

    output::success("Logged out");
    Ok(())
}
