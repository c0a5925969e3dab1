//! Whoami command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;

use bizdash_core::CredentialStore;

use crate::output;
use crate::session::{Settings, storage};

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub fn run(_args: WhoamiArgs, settings: &Settings) -> Result<()> {
    let store = storage::open_store(settings)?;
    let session = store.get().context("Failed to load session")?;

    if !session.is_authenticated() {
        bail!("No active session. Run 'bizdash auth login' first.");
    }

    match session.user() {
        Some(user) => {
            output::field("User", &user.username);
            output::field("Name", &user.display_name());
            if let Some(email) = &user.email {
                output::field("Email", email);
            }
        }
        None => output::field("User", "(unknown)"),
    }
    if let Some(updated_at) = session.updated_at() {
        output::field("Updated", &updated_at.to_rfc3339());
    }
    output::field("Store", &store.path().display().to_string());

    Ok(())
}
