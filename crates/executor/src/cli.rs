use std::path::PathBuf;

use clap::{Parser, Subcommand};
use common::auth::MAX_TOKEN_TTL_MINUTES;
use common::config::{CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};

#[derive(Debug, Parser)]
#[command(name = "trigger", version, about = "Authenticated HTTP trigger for a trading terminal")]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, env = CONFIG_PATH_ENV, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Connect the terminal and serve the HTTP API (default)
    Serve,
    /// Print an access token signed with the configured secret
    IssueToken {
        #[arg(long)]
        subject: String,
        /// Overrides auth.token_ttl_minutes
        #[arg(long, value_parser = clap::value_parser!(i64).range(1..=MAX_TOKEN_TTL_MINUTES))]
        ttl_minutes: Option<i64>,
    },
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}
