use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::config::StrategySettings;
use common::models::{Side, TradeSignal};
use tracing::debug;

/// Turns a symbol into an optional trade signal. `Ok(None)` means "nothing
/// to do" and is the common case.
#[async_trait]
pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate_signal(&self, symbol: &str) -> anyhow::Result<Option<TradeSignal>>;
}

/// Never signals.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdleStrategy;

#[async_trait]
impl Strategy for IdleStrategy {
    fn name(&self) -> &'static str {
        "idle"
    }

    async fn generate_signal(&self, symbol: &str) -> anyhow::Result<Option<TradeSignal>> {
        debug!("No signal for {}", symbol);
        Ok(None)
    }
}

/// Emits whatever side the configured table holds for a symbol.
#[derive(Debug, Clone)]
pub struct StaticStrategy {
    // Map symbol (uppercase) -> side
    table: HashMap<String, Side>,
}

impl StaticStrategy {
    pub const REASON: &'static str = "STATIC_TABLE";

    pub fn new(table: &HashMap<String, Side>) -> Self {
        let table = table
            .iter()
            .map(|(symbol, side)| (symbol.trim().to_uppercase(), *side))
            .collect();
        Self { table }
    }
}

#[async_trait]
impl Strategy for StaticStrategy {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn generate_signal(&self, symbol: &str) -> anyhow::Result<Option<TradeSignal>> {
        let key = symbol.trim().to_uppercase();
        let signal = self
            .table
            .get(&key)
            .map(|side| TradeSignal::new(key.clone(), *side, Self::REASON));

        match &signal {
            Some(s) => debug!("Signal for {}: {}", key, s),
            None => debug!("No table entry for {}", key),
        }
        Ok(signal)
    }
}

/// Picks the static table when one is configured, otherwise stays idle.
pub fn from_settings(settings: &StrategySettings) -> Arc<dyn Strategy> {
    if settings.signals.is_empty() {
        Arc::new(IdleStrategy)
    } else {
        Arc::new(StaticStrategy::new(&settings.signals))
    }
}
