//! Auth subcommand implementations.

mod login;
mod logout;
mod profile;
mod refresh;
mod whoami;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::session::Settings;

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Sign in and store the session
    Login(login::LoginArgs),

    /// Forget the stored session
    Logout(logout::LogoutArgs),

    /// Display the stored session
    Whoami(whoami::WhoamiArgs),

    /// Refresh the access token now
    Refresh(refresh::RefreshArgs),

    /// Fetch the signed-in user's profile from the API
    Profile(profile::ProfileArgs),
}

pub async fn handle(cmd: AuthCommand, settings: &Settings) -> Result<()> {
    match cmd.command {
        AuthSubcommand::Login(args) => login::run(args, settings).await,
        AuthSubcommand::Logout(args) => logout::run(args, settings),
        AuthSubcommand::Whoami(args) => whoami::run(args, settings),
        AuthSubcommand::Refresh(args) => refresh::run(args, settings).await,
        AuthSubcommand::Profile(args) => profile::run(args, settings).await,
    }
}
