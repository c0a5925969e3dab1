//! bizdash-core - Session, credential and error types for the bizdash API client.
//!
//! The HTTP machinery lives in `bizdash-http`; this crate holds the pieces
//! every layer agrees on: opaque tokens, the persisted [`Session`], the
//! [`CredentialStore`] seam and the unified [`Error`] type.

pub mod credentials;
pub mod error;
pub mod session;
pub mod store;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::Credentials;
pub use error::Error;
pub use session::{Session, UserProfile};
pub use store::MemoryCredentialStore;
pub use tokens::{AccessToken, RefreshToken};
pub use traits::{CredentialStore, LogSignOut, SignOutHandler, TokenRefresher};
pub use types::ApiUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
