use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use common::auth::JwtAuthority;
use tracing::debug;

use crate::http::error::ApiError;

/// Rejects requests without a valid bearer token. On success the verified
/// `Claims` are placed in the request extensions.
pub async fn require_bearer(
    State(auth): State<Arc<JwtAuthority>>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .map(|v| v.to_str().unwrap_or_default());

    match auth.verify_header(header) {
        Ok(claims) => {
            debug!("Authenticated {} for {}", claims.sub, request.uri().path());
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}
