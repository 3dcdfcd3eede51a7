mod cli;
mod compile;
mod convert;
mod package;
mod verify;

use std::io;

use anyhow::{Context, Result};
use clap::Parser;

use hunter_core::config::load_dotenv;
use hunter_core::Config;

use crate::cli::{CliArgs, Command, VerifyCommand};

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the operator reports.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    load_dotenv();
    let args = CliArgs::parse();

    let mut config =
        Config::load(args.config.as_deref()).context("failed to load configuration")?;

    match args.command {
        Command::Compile(compile_args) => {
            compile_args.apply(&mut config);
            config.log_summary();
            compile::run(&compile_args, config)
        }
        Command::Convert(convert_args) => convert::run(&convert_args, &mut io::stdout().lock()),
        Command::Verify(VerifyCommand::Recmd(verify_args)) => {
            config.log_summary();
            verify::run(&verify_args, config, &mut io::stdout().lock())
        }
    }
}
