//! CLI argument definitions.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use bizdash_http::DEFAULT_API_URL;

use crate::commands::api::ApiCommand;
use crate::commands::auth::AuthCommand;
use crate::session::Settings;

/// Command-line client for the bizdash REST API.
#[derive(Parser, Debug)]
#[command(name = "bizdash")]
#[command(author, version = env!("BIZDASH_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// API base URL
    #[arg(long, env = "BIZDASH_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Session file (defaults to the platform data directory)
    #[arg(long, env = "BIZDASH_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Seconds to wait for a token refresh before giving up
    #[arg(long, default_value_t = 30, global = true)]
    pub refresh_timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn settings(&self) -> Settings {
        Settings {
            api_url: self.api_url.clone(),
            store: self.store.clone(),
            refresh_timeout: Duration::from_secs(self.refresh_timeout),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in, sign out and inspect the stored session
    Auth(AuthCommand),

    /// Send an authenticated request to the API
    Api(ApiCommand),
}
