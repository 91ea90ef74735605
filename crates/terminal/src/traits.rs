use async_trait::async_trait;

use crate::error::TerminalError;
use crate::models::{Credentials, OrderReceipt, OrderRequest, TerminalStatus};

/// The vendor binding, seen from this process. Implementations are driven
/// exclusively through a `TerminalSession`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TradingTerminal: Send + Sync {
    fn name(&self) -> &'static str;

    async fn initialize(&self, credentials: &Credentials) -> Result<(), TerminalError>;

    async fn shutdown(&self);

    async fn order_send(&self, request: &OrderRequest) -> Result<OrderReceipt, TerminalError>;

    /// The most recent error the binding recorded, `(0, "")` style values
    /// mean none.
    async fn last_error(&self) -> TerminalStatus;
}
