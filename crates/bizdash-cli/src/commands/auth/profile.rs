//! Profile command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::output;
use crate::session::{Settings, storage};

#[derive(Args, Debug)]
pub struct ProfileArgs {}

pub async fn run(_args: ProfileArgs, settings: &Settings) -> Result<()> {
    let client = storage::client(settings)?;

    let profile = client
        .fetch_profile()
        .await
        .context("Failed to fetch profile")?;

    output::json_pretty(&profile)?;
    Ok(())
}
