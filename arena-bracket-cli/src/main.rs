mod commands;
mod config;
mod logger;
mod state;

use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use thiserror::Error;

use crate::commands::Command;
use crate::config::Config;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// Path of the config file.
    #[arg(short, long, default_value = "arena-bracket.toml")]
    config: PathBuf,
    /// Path of the state file, overriding the config.
    #[arg(short, long)]
    state: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Bracket(#[from] arena_bracket::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid option {0:?}: expected key=value")]
    InvalidOptionArgument(String),
    #[error("invalid participant id: {0:?}")]
    InvalidParticipantId(String),
}

fn main() {
    let args = Args::parse();

    let config = match Config::from_file_or_default(&args.config) {
        Ok(config) => config.with_environment(),
        Err(err) => {
            eprintln!("Failed to read config {}: {}", args.config.display(), err);
            process::exit(2);
        }
    };

    logger::init(config.loglevel);
    log::debug!("Using config: {:?}", config);

    let path = args.state.unwrap_or_else(|| config.state.clone());

    if let Err(err) = args.command.run(&config, &path) {
        log::debug!("Command failed: {:?}", err);
        eprintln!("{}", err);
        process::exit(1);
    }
}
