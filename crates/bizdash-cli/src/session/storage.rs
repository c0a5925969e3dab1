//! Session storage for persisting login state.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use bizdash_core::ApiUrl;
use bizdash_core::error::AuthError;
use bizdash_file::FileCredentialStore;
use bizdash_http::{ApiClient, ClientConfig};

use super::Settings;
use crate::output;

/// Resolve the session file path, creating the data directory if needed.
fn session_path(settings: &Settings) -> Result<PathBuf> {
    if let Some(path) = &settings.store {
        return Ok(path.clone());
    }

    let dirs =
        ProjectDirs::from("", "", "bizdash").context("Could not determine data directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("session.json"))
}

/// Open the file-backed credential store.
pub fn open_store(settings: &Settings) -> Result<Arc<FileCredentialStore>> {
    let path = session_path(settings)?;
    tracing::debug!(path = %path.display(), "Using session file");
    Ok(Arc::new(FileCredentialStore::new(path)))
}

/// Build an API client over the stored session.
///
/// A forced sign-out prints a hint pointing back at `bizdash auth login`.
pub fn client(settings: &Settings) -> Result<ApiClient> {
    let api_url = ApiUrl::new(&settings.api_url).context("Invalid API URL")?;
    let config = ClientConfig::new(api_url)
        .with_refresh_timeout(Some(settings.refresh_timeout))
        .with_user_agent(format!("bizdash-cli/{}", env!("BIZDASH_VERSION")));

    let store = open_store(settings)?;
    let client = ApiClient::with_sign_out(
        config,
        store,
        Arc::new(|reason: &AuthError| {
            output::error(&format!("Signed out: {}", reason));
            eprintln!("Run 'bizdash auth login' to sign in again.");
        }),
    )
    .context("Failed to build API client")?;

    Ok(client)
}
