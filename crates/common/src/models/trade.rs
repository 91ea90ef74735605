use serde::{Deserialize, Serialize};

pub const TRADE_PROCESSED: &str = "Trade processed";

/// Body of `POST /api/start`. The symbol is optional at the wire level so a
/// missing field can be reported instead of rejected by the decoder.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TradeRequest {
    #[serde(default)]
    pub symbol: Option<String>,
}

impl TradeRequest {
    /// Trimmed symbol, or `None` when absent or blank.
    pub fn symbol(&self) -> Option<&str> {
        self.symbol
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeAck {
    pub message: String,
}

impl TradeAck {
    pub fn processed() -> Self {
        Self {
            message: TRADE_PROCESSED.to_string(),
        }
    }
}
