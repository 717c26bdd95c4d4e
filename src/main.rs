//! pagefs-server - Entry Point
//!
//! Serves a directory tree as a path-addressable object store, with a
//! draft/published page workflow.

use log::{error, info};
use std::process::ExitCode;

use pagefs_server::{Server, ServerConfig};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Launching pagefs server...");

    let server = match Server::bind(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    server.start().await;
    ExitCode::SUCCESS
}
