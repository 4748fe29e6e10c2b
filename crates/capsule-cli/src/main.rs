//! Time Capsule CLI - seal content under a password until a chosen time.
//!
//! Thin front end over `capsule-core`: argument parsing, config, prompts
//! and console rendering.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod display;
mod errors;
mod logging;
mod passwords;
mod ui;

use clap::{CommandFactory, Parser};
use clap_complete::generate;

use capsule_core::VERSION;

use crate::cli::{Cli, Commands};
use crate::errors::{exit_code_for, CliError};

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.quiet, cli.verbose);

    if let Err(err) = run(&cli) {
        if let Some(cli_err) = err.downcast_ref::<CliError>() {
            cli_err.exit();
        }
        eprintln!("Error: {:#}", err);
        std::process::exit(exit_code_for(&err));
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Init(args)) => commands::handle_init(cli, args),
        Some(Commands::Create(args)) => commands::handle_create(cli, args),
        Some(Commands::Unlock(args)) => commands::handle_unlock(cli, args),
        Some(Commands::Check(args)) => commands::handle_check(cli, args),
        Some(Commands::Autounlock(args)) => commands::handle_autounlock(cli, args),
        Some(Commands::Doctor) => commands::handle_doctor(cli),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "timecapsule", &mut std::io::stdout());
            Ok(())
        }
        None => {
            println!("Time Capsule v{}", VERSION);
            println!("\nRun `timecapsule --help` for usage information.");
            Ok(())
        }
    }
}
