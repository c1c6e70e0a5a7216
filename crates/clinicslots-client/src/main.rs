//! clinicslots CLI entry point.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{Level, debug};

use clinicslots_client::cli::{Cli, Command, ConfigAction, TokenAction};
use clinicslots_client::commands;
use clinicslots_client::config::ClientConfig;
use clinicslots_client::error::{ClientError, ClientResult};
use clinicslots_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let config = if cli.config.is_some() {
        ClientConfig::load_from(&config_path)
    } else {
        ClientConfig::load()
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", ClientError::Config(e));
            return ExitCode::FAILURE;
        }
    };

    let tracing = TracingConfig::cli().with_format(cli.log_format);
    let tracing = if cli.debug || config.debug {
        tracing.with_level(Level::DEBUG)
    } else {
        tracing
    };
    if let Err(e) = init_tracing(tracing) {
        eprintln!("warning: logging disabled: {}", e);
    }
    debug!(path = %config_path.display(), "configuration loaded");

    match run(cli.command, &config, &config_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: &ClientConfig, config_path: &Path) -> ClientResult<()> {
    match command {
        Command::Availability(args) => commands::availability::run(&args, config).await,
        Command::Token { action } => match action {
            TokenAction::Encrypt { token } => {
                println!("{}", commands::token::encrypt(&token, config)?);
                Ok(())
            }
            TokenAction::Decrypt { ciphertext } => {
                println!("{}", commands::token::decrypt(&ciphertext, config)?);
                Ok(())
            }
            TokenAction::Resolve { scheduler, show } => {
                let resolved = commands::token::resolve(scheduler, config)?;
                println!("{}", commands::token::describe(resolved.as_ref(), show));
                Ok(())
            }
        },
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(config, config_path),
            ConfigAction::Validate => {
                for line in commands::config::validate(config)? {
                    println!("{}", line);
                }
                Ok(())
            }
            ConfigAction::Path => commands::config::path(config_path),
        },
    }
}
