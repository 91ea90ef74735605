use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::error::TerminalError;
use crate::models::{Credentials, OrderReceipt, OrderRequest};
use crate::traits::TradingTerminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Up,
    Down,
}

/// The one live connection to the trading platform.
///
/// Every call into the terminal goes through the state lock, so concurrent
/// requests never interleave on the underlying handle and nothing is sent
/// after `shutdown`.
pub struct TerminalSession {
    terminal: Arc<dyn TradingTerminal>,
    state: Mutex<ConnectionState>,
}

impl TerminalSession {
    /// Initializes the terminal. An error here is meant to abort startup.
    pub async fn connect(
        terminal: Arc<dyn TradingTerminal>,
        credentials: &Credentials,
    ) -> Result<Self, TerminalError> {
        info!(
            "Connecting to {} terminal (login {} @ {})",
            terminal.name(),
            credentials.login,
            credentials.server
        );

        if let Err(e) = terminal.initialize(credentials).await {
            let last = terminal.last_error().await;
            error!("Failed to initialize terminal: {} last_error={}", e, last);
            return Err(e);
        }
        info!("Terminal connected");

        Ok(Self {
            terminal,
            state: Mutex::new(ConnectionState::Up),
        })
    }

    pub async fn state(&self) -> ConnectionState {
        *self.state.lock().await
    }

    pub async fn submit(&self, request: &OrderRequest) -> Result<OrderReceipt, TerminalError> {
        request.validate().map_err(TerminalError::InvalidOrder)?;

        let state = self.state.lock().await;
        if *state != ConnectionState::Up {
            warn!("Dropping order for {}: terminal is down", request.symbol);
            return Err(TerminalError::NotConnected);
        }

        let receipt = self.terminal.order_send(request).await?;
        if !receipt.is_accepted() {
            error!(
                "ORDER REJECTED: {} retcode={} comment={}",
                request.symbol, receipt.retcode, receipt.comment
            );
            return Err(TerminalError::OrderRejected {
                retcode: receipt.retcode,
                comment: receipt.comment,
            });
        }

        info!(
            "ORDER EXECUTED: ticket={} {} {} @ {}",
            receipt.ticket, request.symbol, receipt.volume, receipt.price
        );
        Ok(receipt)
    }

    /// Idempotent.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        if *state == ConnectionState::Down {
            return;
        }
        self.terminal.shutdown().await;
        *state = ConnectionState::Down;
        info!("Terminal disconnected");
    }
}
