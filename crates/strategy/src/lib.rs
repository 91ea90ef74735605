pub mod services;

pub use services::strategy_service::{IdleStrategy, StaticStrategy, Strategy, from_settings};
