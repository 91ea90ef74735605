pub mod error;
pub mod models;
pub mod paper;
pub mod remote;
pub mod session;
pub mod traits;

use std::sync::Arc;

use common::config::{TerminalKind, TerminalSettings};

pub use error::TerminalError;
pub use models::{Credentials, OrderReceipt, OrderRequest};
pub use paper::PaperTerminal;
pub use remote::BridgeTerminal;
pub use session::{ConnectionState, TerminalSession};
pub use traits::TradingTerminal;

/// Builds the terminal backend named in the settings. Nothing is contacted
/// until the session initializes it.
pub fn from_settings(settings: &TerminalSettings) -> Result<Arc<dyn TradingTerminal>, TerminalError> {
    match settings.kind {
        TerminalKind::Paper => Ok(Arc::new(PaperTerminal::new())),
        TerminalKind::Bridge => {
            let url = settings
                .bridge_url
                .as_deref()
                .ok_or_else(|| TerminalError::Config("bridge_url is not set".to_string()))?;
            let client = BridgeTerminal::new(url, settings.bridge_key.clone(), settings.timeout_ms)?;
            Ok(Arc::new(client))
        }
    }
}
