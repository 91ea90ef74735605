mod bridge_client;

pub use bridge_client::BridgeTerminal;
