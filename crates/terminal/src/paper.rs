use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::info;

use crate::error::TerminalError;
use crate::models::{Credentials, OrderReceipt, OrderRequest, TRADE_RETCODE_DONE, TerminalStatus};
use crate::traits::TradingTerminal;

/// In-process stand-in for the vendor terminal. Fills every valid order
/// immediately at price 0 and numbers tickets from 1.
#[derive(Debug, Default)]
pub struct PaperTerminal {
    next_ticket: AtomicU64,
    last_error: Mutex<TerminalStatus>,
}

impl PaperTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, code: i64, message: &str) {
        if let Ok(mut last) = self.last_error.lock() {
            *last = TerminalStatus {
                code,
                message: message.to_string(),
            };
        }
    }
}

#[async_trait]
impl TradingTerminal for PaperTerminal {
    fn name(&self) -> &'static str {
        "paper"
    }

    async fn initialize(&self, credentials: &Credentials) -> Result<(), TerminalError> {
        if credentials.login == 0 || credentials.password.is_empty() || credentials.server.is_empty() {
            let message = "Invalid params";
            self.record(-2, message);
            return Err(TerminalError::InitFailed {
                code: -2,
                message: message.to_string(),
            });
        }
        self.record(1, "Success");
        info!("Paper terminal ready for {}", credentials.login);
        Ok(())
    }

    async fn shutdown(&self) {
        info!("Paper terminal closed");
    }

    async fn order_send(&self, request: &OrderRequest) -> Result<OrderReceipt, TerminalError> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            "PAPER FILL: ticket={} {:?} {} {}",
            ticket, request.order_type, request.volume, request.symbol
        );
        Ok(OrderReceipt {
            retcode: TRADE_RETCODE_DONE,
            ticket,
            volume: request.volume,
            price: 0.0,
            comment: "Paper fill".to_string(),
        })
    }

    async fn last_error(&self) -> TerminalStatus {
        self.last_error
            .lock()
            .map(|last| last.clone())
            .unwrap_or_default()
    }
}
