use std::sync::Arc;

use async_trait::async_trait;
use common::config::RiskSettings;
use common::models::TradeSignal;
use terminal::{OrderReceipt, OrderRequest, TerminalError, TerminalSession};
use tracing::info;

/// Last stop before the terminal.
#[async_trait]
pub trait RiskManager: Send + Sync {
    async fn execute_trade(&self, symbol: &str, signal: &TradeSignal) -> Result<(), TerminalError>;
}

/// Logs every trade intent and, when order submission is switched on,
/// forwards a market order through the terminal session.
pub struct RiskService {
    session: Arc<TerminalSession>,
    settings: RiskSettings,
}

impl RiskService {
    pub const ORDER_COMMENT: &'static str = "trigger";

    pub fn new(session: Arc<TerminalSession>, settings: RiskSettings) -> Self {
        Self { session, settings }
    }

    /// The terminal gets the strategy's spelling of the symbol (brokers may
    /// be case-sensitive); the request's symbol is only a fallback.
    fn order_for(&self, symbol: &str, signal: &TradeSignal) -> OrderRequest {
        let volume = signal.quantity.unwrap_or(self.settings.volume);
        let symbol = match signal.symbol.trim() {
            "" => symbol,
            canonical => canonical,
        };
        OrderRequest::market(symbol, signal.side, volume)
            .with_deviation(self.settings.deviation)
            .with_magic(self.settings.magic)
            .with_comment(Self::ORDER_COMMENT)
    }

    async fn submit(&self, symbol: &str, signal: &TradeSignal) -> Result<OrderReceipt, TerminalError> {
        let order = self.order_for(symbol, signal);
        self.session.submit(&order).await
    }
}

#[async_trait]
impl RiskManager for RiskService {
    async fn execute_trade(&self, symbol: &str, signal: &TradeSignal) -> Result<(), TerminalError> {
        info!("Executing trade for {} with signal {}", symbol, signal);

        if !self.settings.submit_orders {
            info!("Order submission disabled, {} not sent", symbol);
            return Ok(());
        }

        self.submit(symbol, signal).await.map(|_| ())
    }
}
