use std::fmt;

use common::config::TerminalSettings;
use common::models::Side;
use serde::{Deserialize, Serialize};

/// Request completed.
pub const TRADE_RETCODE_DONE: u32 = 10009;
/// Order placed, fill pending.
pub const TRADE_RETCODE_PLACED: u32 = 10008;

/// Immediate market execution.
pub const TRADE_ACTION_DEAL: u8 = 1;

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub login: u64,
    pub password: String,
    pub server: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("server", &self.server)
            .field("path", &self.path)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl From<&TerminalSettings> for Credentials {
    fn from(settings: &TerminalSettings) -> Self {
        Self {
            login: settings.login,
            password: settings.password.clone(),
            server: settings.server.clone(),
            path: settings.path.clone(),
            timeout: settings.timeout_ms,
        }
    }
}

/// Order types as the binding numbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OrderType {
    Buy,
    Sell,
}

impl From<OrderType> for u8 {
    fn from(value: OrderType) -> Self {
        match value {
            OrderType::Buy => 0,
            OrderType::Sell => 1,
        }
    }
}

impl TryFrom<u8> for OrderType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Buy),
            1 => Ok(Self::Sell),
            other => Err(format!("unsupported order type {}", other)),
        }
    }
}

impl From<Side> for OrderType {
    fn from(side: Side) -> Self {
        match side {
            Side::Buy => Self::Buy,
            Side::Sell => Self::Sell,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub action: u8,
    pub symbol: String,
    pub volume: f64,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub deviation: u32,
    pub magic: u64,
    pub comment: String,
}

impl OrderRequest {
    pub fn market(symbol: &str, side: Side, volume: f64) -> Self {
        Self {
            action: TRADE_ACTION_DEAL,
            symbol: symbol.to_string(),
            volume,
            order_type: side.into(),
            deviation: 0,
            magic: 0,
            comment: String::new(),
        }
    }

    pub fn with_deviation(mut self, deviation: u32) -> Self {
        self.deviation = deviation;
        self
    }

    pub fn with_magic(mut self, magic: u64) -> Self {
        self.magic = magic;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.symbol.trim().is_empty() {
            return Err("symbol is empty".to_string());
        }
        if !(self.volume.is_finite() && self.volume > 0.0) {
            return Err(format!("volume {} is not positive", self.volume));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub retcode: u32,
    /// Ticket of the resulting order, 0 if none.
    #[serde(rename = "order")]
    pub ticket: u64,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub comment: String,
}

impl OrderReceipt {
    pub fn is_accepted(&self) -> bool {
        matches!(self.retcode, TRADE_RETCODE_DONE | TRADE_RETCODE_PLACED)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalStatus {
    pub code: i64,
    pub message: String,
}

impl fmt::Display for TerminalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, '{}')", self.code, self.message)
    }
}
