//! bizdash-http - Authenticated REST client with single-flight token refresh.
//!
//! Every request goes through [`ApiClient::send`]. It attaches the stored
//! access token and recognizes an expired token from the backend's 401.
//! It then either starts a refresh or joins the one already in flight,
//! and replays the request once with the new token. However many requests
//! fail together, the refresh endpoint is called once.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bizdash_core::{ApiUrl, Credentials, MemoryCredentialStore};
//! use bizdash_http::{ApiClient, ClientConfig};
//!
//! # async fn example() -> Result<(), bizdash_core::Error> {
//! let config = ClientConfig::new(ApiUrl::new("https://dashboard.example.com/api")?);
//! let client = ApiClient::new(config, Arc::new(MemoryCredentialStore::new()))?;
//!
//! client.login(Credentials::new("alice", "hunter2")).await?;
//! let expenses: serde_json::Value = client.get_json("expense/").await?;
//! # Ok(())
//! # }
//! ```

mod authenticator;
mod classifier;
mod client;
mod config;
mod coordinator;
pub mod endpoints;
mod refresher;
mod request;
mod terminator;
mod transport;

pub use classifier::{FailureClass, classify};
pub use client::ApiClient;
pub use config::{ClientConfig, DEFAULT_API_URL, DEFAULT_REFRESH_TIMEOUT, DEFAULT_REQUEST_TIMEOUT};
pub use coordinator::RefreshCoordinator;
pub use refresher::HttpRefresher;
pub use request::{ApiRequest, ApiResponse, AttemptState, AuthMode};
pub use reqwest::{Method, StatusCode};
pub use terminator::SessionTerminator;
