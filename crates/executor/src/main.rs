use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use common::auth::JwtAuthority;
use common::config::AppConfig;
use common::logger;
use dotenvy::dotenv;
use tracing::{debug, info};

use crate::cli::{Cli, Command};

mod app;
mod cli;
mod http;
mod services;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    match cli.command() {
        Command::Serve => serve(config).await,
        Command::IssueToken {
            subject,
            ttl_minutes,
        } => {
            let ttl = ttl_minutes.unwrap_or(config.auth.token_ttl_minutes);
            let token = JwtAuthority::new(config.auth.secret(), ttl)?.issue(&subject)?;
            println!("{}", token);
            Ok(())
        }
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    logger::setup_logger(&config.log.level);
    debug!("System starting up...");

    // Bind first: a bad address must fail before the terminal is connected.
    let listener = http::server::bind(&config.server).await?;
    let terminal = terminal::from_settings(&config.terminal)?;
    let app = app::bootstrap(&config, Arc::clone(&terminal)).await?;
    info!("Terminal backend: {}", terminal.name());

    http::server::run(listener, app).await
}
