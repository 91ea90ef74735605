use std::sync::Arc;

use common::auth::JwtAuthority;
use strategy::Strategy;

use crate::services::risk_service::RiskManager;

/// Everything a request handler may touch. Built once in `app::bootstrap`.
#[derive(Clone)]
pub struct AppState {
    pub strategy: Arc<dyn Strategy>,
    pub risk: Arc<dyn RiskManager>,
    pub auth: Arc<JwtAuthority>,
}

impl AppState {
    pub fn new(
        strategy: Arc<dyn Strategy>,
        risk: Arc<dyn RiskManager>,
        auth: Arc<JwtAuthority>,
    ) -> Self {
        Self {
            strategy,
            risk,
            auth,
        }
    }
}
