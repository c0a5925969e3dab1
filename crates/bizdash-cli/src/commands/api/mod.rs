//! Raw API request subcommands.

use anyhow::{Context, Result, anyhow};
use clap::{Args, Subcommand};

use bizdash_http::{ApiRequest, Method};

use crate::output;
use crate::session::{Settings, storage};

#[derive(Args, Debug)]
pub struct ApiCommand {
    #[command(subcommand)]
    pub command: ApiSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ApiSubcommand {
    /// Send a GET request
    Get(RequestArgs),
    /// Send a POST request
    Post(RequestArgs),
    /// Send a PUT request
    Put(RequestArgs),
    /// Send a PATCH request
    Patch(RequestArgs),
    /// Send a DELETE request
    Delete(RequestArgs),
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Path relative to the API root (e.g. expense/)
    pub path: String,

    /// JSON request body
    #[arg(long)]
    pub data: Option<String>,

    /// Query parameter as key=value (repeatable)
    #[arg(long = "query", value_parser = parse_query_pair)]
    pub query: Vec<(String, String)>,
}

pub async fn handle(cmd: ApiCommand, settings: &Settings) -> Result<()> {
    let (method, args) = match cmd.command {
        ApiSubcommand::Get(args) => (Method::GET, args),
        ApiSubcommand::Post(args) => (Method::POST, args),
        ApiSubcommand::Put(args) => (Method::PUT, args),
        ApiSubcommand::Patch(args) => (Method::PATCH, args),
        ApiSubcommand::Delete(args) => (Method::DELETE, args),
    };

    let request = build_request(method, args)?;
    let client = storage::client(settings)?;

    let response = client.send(&request).await.context("Request failed")?;

    if response.is_empty() {
        output::success(&response.status().to_string());
        return Ok(());
    }

    output::body(response.bytes())
}

fn build_request(method: Method, args: RequestArgs) -> Result<ApiRequest> {
    let mut request = ApiRequest::new(method, args.path);

    if let Some(data) = &args.data {
        let body: serde_json::Value =
            serde_json::from_str(data).context("--data must be valid JSON")?;
        request = request.with_json(&body)?;
    }

    for (key, value) in args.query {
        request = request.with_query(key, value);
    }

    Ok(request)
}

fn parse_query_pair(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected key=value, got '{}'", s))?;
    Ok((key.to_string(), value.to_string()))
}
