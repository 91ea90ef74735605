use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Extension, Json, Router, middleware};
use common::auth::Claims;
use common::models::{TradeAck, TradeRequest};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::http::error::ApiError;
use crate::http::middleware::require_bearer;
use crate::state::AppState;

pub const PATH_START: &str = "/api/start";
pub const PATH_HEALTH: &str = "/api/health";

pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(PATH_START, post(start))
        .route_layer(middleware::from_fn_with_state(
            state.auth.clone(),
            require_bearer,
        ));

    Router::new()
        .route(PATH_HEALTH, get(health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Strategy first; the risk manager only runs when a signal came back. The
/// acknowledgment is the same either way.
async fn start(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<TradeRequest>, JsonRejection>,
) -> Result<Json<TradeAck>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadBody(e.body_text()))?;
    let symbol = request.symbol().ok_or(ApiError::MissingSymbol)?;
    info!("Trade requested by {} for {}", claims.sub, symbol);

    let signal = state
        .strategy
        .generate_signal(symbol)
        .await
        .map_err(ApiError::Strategy)?;

    match signal {
        Some(signal) => state.risk.execute_trade(symbol, &signal).await?,
        None => info!("No signal for {}, nothing to execute", symbol),
    }

    Ok(Json(TradeAck::processed()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use common::auth::JwtAuthority;
    use common::models::{Side, TradeSignal};
    use mockall::mock;
    use strategy::Strategy;
    use terminal::TerminalError;
    use tower::ServiceExt;

    use super::*;
    use crate::services::risk_service::RiskManager;

    const SECRET: &str = "test-secret";

    mock! {
        pub Signals {}

        #[async_trait]
        impl Strategy for Signals {
            fn name(&self) -> &'static str;
            async fn generate_signal(&self, symbol: &str) -> anyhow::Result<Option<TradeSignal>>;
        }
    }

    mock! {
        pub Risk {}

        #[async_trait]
        impl RiskManager for Risk {
            async fn execute_trade(&self, symbol: &str, signal: &TradeSignal) -> Result<(), TerminalError>;
        }
    }

    fn router(strategy: MockSignals, risk: MockRisk) -> Router {
        let state = AppState::new(
            Arc::new(strategy),
            Arc::new(risk),
            Arc::new(JwtAuthority::new(SECRET, 15).unwrap()),
        );
        create_router(state)
    }

    fn token() -> String {
        JwtAuthority::new(SECRET, 15)
            .unwrap()
            .issue("tester")
            .unwrap()
    }

    fn start_request(auth: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(PATH_START)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn untouched() -> (MockSignals, MockRisk) {
        let mut strategy = MockSignals::new();
        strategy.expect_generate_signal().never();
        let mut risk = MockRisk::new();
        risk.expect_execute_trade().never();
        (strategy, risk)
    }

    #[tokio::test]
    async fn missing_credential_is_unauthorized() {
        let (strategy, risk) = untouched();
        let request = start_request(None, r#"{"symbol": "EURUSD"}"#);

        let (status, body) = send(router(strategy, risk), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["msg"], "Missing Authorization Header");
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_rejected() {
        let (strategy, risk) = untouched();
        let forged = JwtAuthority::new("not-the-secret", 15)
            .unwrap()
            .issue("tester")
            .unwrap();
        let request = start_request(Some(&format!("Bearer {}", forged)), r#"{"symbol": "EURUSD"}"#);

        let (status, body) = send(router(strategy, risk), request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["msg"], "Signature verification failed");
    }

    #[tokio::test]
    async fn undecodable_token_is_unprocessable() {
        let (strategy, risk) = untouched();
        let request = start_request(Some("Bearer !!!.abc.def"), r#"{"symbol": "EURUSD"}"#);

        let (status, body) = send(router(strategy, risk), request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["msg"], "Invalid token");
    }

    #[tokio::test]
    async fn truncated_token_is_unprocessable() {
        let (strategy, risk) = untouched();
        let request = start_request(Some("Bearer abc.def"), r#"{"symbol": "EURUSD"}"#);

        let (status, body) = send(router(strategy, risk), request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["msg"], "Not enough segments");
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_rejected() {
        let (strategy, risk) = untouched();
        let request = start_request(Some(&format!("Token {}", token())), r#"{"symbol": "EURUSD"}"#);

        let (status, _) = send(router(strategy, risk), request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn no_signal_skips_risk_manager() {
        let mut strategy = MockSignals::new();
        strategy
            .expect_generate_signal()
            .withf(|symbol| symbol == "EURUSD")
            .times(1)
            .returning(|_| Ok(None));
        let mut risk = MockRisk::new();
        risk.expect_execute_trade().never();

        let request = start_request(Some(&format!("Bearer {}", token())), r#"{"symbol": "EURUSD"}"#);
        let (status, body) = send(router(strategy, risk), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Trade processed" }));
    }

    #[tokio::test]
    async fn signal_reaches_risk_manager_exactly_once() {
        let expected = TradeSignal::new("EURUSD", Side::Buy, "TEST");
        let returned = expected.clone();

        let mut strategy = MockSignals::new();
        strategy
            .expect_generate_signal()
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));
        let mut risk = MockRisk::new();
        risk.expect_execute_trade()
            .withf(move |symbol, signal| symbol == "EURUSD" && *signal == expected)
            .times(1)
            .returning(|_, _| Ok(()));

        let request = start_request(Some(&format!("Bearer {}", token())), r#"{"symbol": "EURUSD"}"#);
        let (status, body) = send(router(strategy, risk), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Trade processed");
    }

    #[tokio::test]
    async fn missing_symbol_is_bad_request() {
        let (strategy, risk) = untouched();
        let request = start_request(Some(&format!("Bearer {}", token())), r#"{"ticker": "EURUSD"}"#);

        let (status, body) = send(router(strategy, risk), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing 'symbol' in request body");
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let (strategy, risk) = untouched();
        let request = start_request(Some(&format!("Bearer {}", token())), "{not json");

        let (status, _) = send(router(strategy, risk), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn strategy_failure_is_server_error() {
        let mut strategy = MockSignals::new();
        strategy
            .expect_generate_signal()
            .returning(|_| Err(anyhow::anyhow!("no market data")));
        let mut risk = MockRisk::new();
        risk.expect_execute_trade().never();

        let request = start_request(Some(&format!("Bearer {}", token())), r#"{"symbol": "EURUSD"}"#);
        let (status, body) = send(router(strategy, risk), request).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("no market data"));
    }

    #[tokio::test]
    async fn execution_failure_is_bad_gateway() {
        let mut strategy = MockSignals::new();
        strategy
            .expect_generate_signal()
            .returning(|symbol| Ok(Some(TradeSignal::new(symbol, Side::Sell, "TEST"))));
        let mut risk = MockRisk::new();
        risk.expect_execute_trade()
            .times(1)
            .returning(|_, _| Err(TerminalError::NotConnected));

        let request = start_request(Some(&format!("Bearer {}", token())), r#"{"symbol": "EURUSD"}"#);
        let (status, _) = send(router(strategy, risk), request).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn health_needs_no_credential() {
        let (strategy, risk) = untouched();
        let request = Request::builder()
            .uri(PATH_HEALTH)
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(router(strategy, risk), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
