use std::path::Path;
use std::process::{Command, Output};

/// Run the CLI binary against `api_url` with an isolated session file.
pub fn run_cli(args: &[&str], api_url: &str, store: &Path) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_bizdash"));
    cmd.args(args);
    cmd.env("BIZDASH_API_URL", api_url);
    cmd.env("BIZDASH_STORE", store);
    cmd.env_remove("BIZDASH_PASSWORD");
    cmd.env_remove("RUST_LOG");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI and expect success.
pub fn run_cli_success(args: &[&str], api_url: &str, store: &Path) -> String {
    let output = run_cli(args, api_url, store);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and expect failure, returning stderr.
pub fn run_cli_failure(args: &[&str], api_url: &str, store: &Path) -> String {
    let output = run_cli(args, api_url, store);
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}
