//! Seams between the HTTP client and its collaborators.

mod refresher;
mod signout;
mod store;

pub use refresher::TokenRefresher;
pub use signout::{LogSignOut, SignOutHandler};
pub use store::CredentialStore;
