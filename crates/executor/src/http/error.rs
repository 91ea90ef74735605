use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::auth::AuthError;
use serde_json::json;
use terminal::TerminalError;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error("Invalid request body: {0}")]
    BadBody(String),
    #[error("Missing 'symbol' in request body")]
    MissingSymbol,
    #[error("Signal generation failed: {0}")]
    Strategy(anyhow::Error),
    #[error("Trade execution failed: {0}")]
    Execution(#[from] TerminalError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Auth(e) if e.is_unauthorized() => StatusCode::UNAUTHORIZED,
            Self::Auth(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadBody(_) | Self::MissingSymbol => StatusCode::BAD_REQUEST,
            Self::Strategy(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Execution(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            // Token errors keep the `msg` key clients of the original API expect.
            Self::Auth(e) => {
                warn!("Rejected request: {}", e);
                json!({ "msg": e.to_string() })
            }
            Self::BadBody(_) | Self::MissingSymbol => {
                warn!("{}", self);
                json!({ "error": self.to_string() })
            }
            Self::Strategy(_) | Self::Execution(_) => {
                error!("{}", self);
                json!({ "error": self.to_string() })
            }
        };
        (status, Json(body)).into_response()
    }
}
