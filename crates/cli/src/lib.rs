pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "bookly",
    about = "Bookly operator CLI",
    long_about = "Operate Bookly: chat with a service assistant from the terminal, inspect effective configuration, and run readiness checks.",
    after_help = "Examples:\n  bookly chat --service \"Home Cleaning\"\n  bookly config\n  bookly doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Open an interactive booking conversation for one service category")]
    Chat {
        #[arg(long, help = "Service category label, e.g. \"Home Cleaning\" or \"Plumbing\"")]
        service: String,
        #[arg(long, default_value = "English", help = "Conversation language: English, Chinese or Malay")]
        language: String,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config and report per-category assistant credential presence")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Chat { service, language } => commands::chat::run(&service, &language),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
