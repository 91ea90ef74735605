use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            other => Err(format!("unknown side '{}'", other)),
        }
    }
}

/// What a strategy hands to the risk manager. Absence of a signal is
/// modelled as `Option::None` at the call site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSignal {
    pub symbol: String,
    pub side: Side,
    /// Lots; the risk manager falls back to its configured volume when unset.
    pub quantity: Option<f64>,
    pub reason: String, // "STATIC_TABLE"
}

impl TradeSignal {
    pub fn new(symbol: impl Into<String>, side: Side, reason: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity: None,
            reason: reason.into(),
        }
    }

    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = Some(quantity);
        self
    }
}

impl fmt::Display for TradeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.side, self.symbol, self.reason)?;
        if let Some(q) = self.quantity {
            write!(f, " qty={}", q)?;
        }
        Ok(())
    }
}
