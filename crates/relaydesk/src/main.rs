// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relaydesk - a support-ticket bridge between Telegram and Discord.
//!
//! This is the binary entry point for the bridge daemon.

mod serve;

use clap::{Parser, Subcommand};

/// Relaydesk - a support-ticket bridge between Telegram and Discord.
#[derive(Parser, Debug)]
#[command(name = "relaydesk", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the bridge daemon.
    Serve,
    /// Load the configuration, report problems, and exit.
    CheckConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match relaydesk_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            relaydesk_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(err) = serve::run_serve(config).await {
                eprintln!("relaydesk serve failed: {err}");
                std::process::exit(1);
            }
        }
        Some(Commands::CheckConfig) => {
            println!(
                "relaydesk: config ok (agent.name={}, storage.data_dir={})",
                config.agent.name, config.storage.data_dir
            );
        }
        None => {
            println!("relaydesk: use --help for available commands");
        }
    }
}
