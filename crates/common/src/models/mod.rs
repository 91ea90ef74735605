pub mod signal;
pub mod trade;

pub use signal::{Side, TradeSignal};
pub use trade::{TradeAck, TradeRequest};
