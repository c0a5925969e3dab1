//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use bizdash_core::Credentials;

use crate::output;
use crate::session::{Settings, storage};

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account username
    #[arg(long)]
    pub username: String,

    /// Account password
    #[arg(long, env = "BIZDASH_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: LoginArgs, settings: &Settings) -> Result<()> {
    let client = storage::client(settings)?;
    let credentials = Credentials::new(&args.username, &args.password);

    eprintln!("{}", "Logging in...".dimmed());

    let session = client.login(credentials).await.context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    if let Some(user) = session.user() {
        output::field("User", &user.username);
        output::field("Name", &user.display_name());
    } else {
        output::field("User", &args.username);
    }
    output::field("API", client.config().base_url().as_str());

    Ok(())
}
