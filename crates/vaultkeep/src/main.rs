// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vaultkeep - a networked secrets vault.
//!
//! This is the binary entry point: `serve` runs the server, every other
//! subcommand is a client call against `client.server_url`.

mod commands;
mod prompt;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::ClientCommand;

/// Vaultkeep - a networked secrets vault.
#[derive(Parser, Debug)]
#[command(name = "vaultkeep", version, about, long_about = None)]
struct Cli {
    /// Configuration file. Defaults to the XDG lookup of vaultkeep.toml.
    #[arg(long, short, global = true, env = "VAULTKEEP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Vaultkeep server.
    Serve,
    #[command(flatten)]
    Client(ClientCommand),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => vaultkeep_config::load_and_validate_path(path),
        None => vaultkeep_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            vaultkeep_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Serve => {
            if let Err(errors) = vaultkeep_config::validate_for_serve(&config) {
                vaultkeep_config::render_errors(&errors);
                std::process::exit(1);
            }
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Client(command) => {
            serve::init_tracing(&config.logging.level);
            let result = match commands::build_client(&config) {
                Ok(client) => commands::run(&client, command).await,
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                eprintln!("error: {e}");
                if e.needs_login() {
                    eprintln!("hint: run `vaultkeep login <login>` first");
                }
                std::process::exit(1);
            }
        }
    }
}
