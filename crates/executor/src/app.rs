use std::sync::Arc;

use axum::Router;
use common::auth::{AuthError, JwtAuthority};
use common::config::AppConfig;
use terminal::{Credentials, TerminalError, TerminalSession, TradingTerminal};
use thiserror::Error;
use tracing::info;

use crate::http::routes;
use crate::services::risk_service::RiskService;
use crate::state::AppState;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Failed to connect to the trading terminal: {0}")]
    Terminal(#[from] TerminalError),
    #[error("Invalid auth settings: {0}")]
    Auth(#[from] AuthError),
}

/// A fully wired service whose terminal connection is live.
pub struct App {
    pub router: Router,
    pub session: Arc<TerminalSession>,
}

/// Connects the terminal, then builds the request path around it. No router
/// exists unless the terminal came up, and nothing that can fail runs after
/// the connection is made.
pub async fn bootstrap(
    config: &AppConfig,
    terminal: Arc<dyn TradingTerminal>,
) -> Result<App, StartupError> {
    let auth = Arc::new(JwtAuthority::new(
        config.auth.secret(),
        config.auth.token_ttl_minutes,
    )?);

    let credentials = Credentials::from(&config.terminal);
    let session = Arc::new(TerminalSession::connect(terminal, &credentials).await?);

    let strategy = strategy::from_settings(&config.strategy);
    let risk = Arc::new(RiskService::new(session.clone(), config.risk.clone()));
    info!(
        "Strategy: {}, order submission: {}",
        strategy.name(),
        if config.risk.submit_orders { "on" } else { "off" }
    );

    let state = AppState::new(strategy, risk, auth);
    Ok(App {
        router: routes::create_router(state),
        session,
    })
}
