use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerminalError {
    #[error("Terminal initialization failed ({code}): {message}")]
    InitFailed { code: i64, message: String },
    #[error("Terminal is not connected")]
    NotConnected,
    #[error("Order rejected (retcode {retcode}): {comment}")]
    OrderRejected { retcode: u32, comment: String },
    #[error("Invalid order: {0}")]
    InvalidOrder(String),
    #[error("Bridge transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Bridge returned HTTP {status}: {body}")]
    Bridge { status: u16, body: String },
    #[error("Terminal misconfigured: {0}")]
    Config(String),
}
