pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod logger;
pub mod peer;
pub mod session;
pub mod signaling;
pub mod ui;
pub mod utils;

pub use config::{AppConfig, Args, Command};
pub use controller::Controller;
pub use error::{ChatError, Result};

/// Entry point behind the binary.
pub async fn run(args: Args) -> anyhow::Result<()> {
    match args.command.clone().unwrap_or(Command::Chat) {
        Command::Chat => {
            let config = AppConfig::from_args(&args)?;
            commands::run_chat(config).await
        }
        Command::Probe { url, timeout_secs } => {
            let server = config::server_config(
                &url,
                args.ice_username.clone(),
                args.ice_credential.clone(),
            );
            commands::run_probe(server, timeout_secs).await
        }
    }
}
