//! RAX FS Shell - Entry Point

use log::{error, info};
use std::process::ExitCode;

use rax_fs_shell::Server;
use rax_fs_shell::auth::JsonCredentialStore;
use rax_fs_shell::config::ShellConfig;
use rax_fs_shell::error::ShellError;

async fn run() -> Result<(), ShellError> {
    let config = ShellConfig::load()?;
    info!(
        "Users root: {}, quota: {:?}, mode: {:?}",
        config.users_root, config.quota_bytes, config.mode
    );

    let credentials = JsonCredentialStore::open(config.credentials_path())?;
    let server = Server::new(config, Box::new(credentials))?;
    server.start().await
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    info!("Launching RAX FS shell...");

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Shell stopped: {}", e);
            ExitCode::FAILURE
        }
    }
}
