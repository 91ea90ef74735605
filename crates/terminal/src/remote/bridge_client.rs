use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{error, info, warn};

use crate::error::TerminalError;
use crate::models::{Credentials, OrderReceipt, OrderRequest, TerminalStatus};
use crate::traits::TradingTerminal;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "X-Bridge-Signature";

#[derive(Debug, Deserialize)]
struct InitializeResponse {
    ok: bool,
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Talks to a sidecar process that hosts the vendor binding and exposes it
/// as JSON over HTTP.
#[derive(Clone)]
pub struct BridgeTerminal {
    client: Client,
    base_url: String,
    key: Option<String>,
}

impl BridgeTerminal {
    pub fn new(base_url: &str, key: Option<String>, timeout_ms: Option<u64>) -> Result<Self, TerminalError> {
        let mut builder = Client::builder();
        if let Some(ms) = timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.filter(|k| !k.is_empty()),
        })
    }

    fn sign(&self, body: &[u8]) -> Option<String> {
        let key = self.key.as_ref()?;
        let mut mac = HmacSha256::new_from_slice(key.as_bytes()).ok()?;
        mac.update(body);
        Some(hex::encode(mac.finalize().into_bytes()))
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, TerminalError>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let payload = serde_json::to_vec(body)
            .map_err(|e| TerminalError::InvalidOrder(e.to_string()))?;
        let url = format!("{}/{}", self.base_url, path);

        let mut request = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(signature) = self.sign(&payload) {
            request = request.header(SIGNATURE_HEADER, signature);
        }

        let resp = request.body(payload).send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await?;
            error!("Bridge call {} failed: HTTP {} {}", path, status, body);
            return Err(TerminalError::Bridge { status, body });
        }

        Ok(resp.json::<R>().await?)
    }
}

#[async_trait]
impl TradingTerminal for BridgeTerminal {
    fn name(&self) -> &'static str {
        "bridge"
    }

    async fn initialize(&self, credentials: &Credentials) -> Result<(), TerminalError> {
        info!("Initializing terminal through bridge at {}", self.base_url);
        let resp: InitializeResponse = self.post("initialize", credentials).await?;
        if !resp.ok {
            return Err(TerminalError::InitFailed {
                code: resp.code,
                message: resp.message,
            });
        }
        Ok(())
    }

    async fn shutdown(&self) {
        if let Err(e) = self.post::<_, serde_json::Value>("shutdown", &serde_json::json!({})).await {
            warn!("Bridge shutdown failed: {}", e);
        }
    }

    async fn order_send(&self, request: &OrderRequest) -> Result<OrderReceipt, TerminalError> {
        info!(
            "Placing Order: {:?} {} {}",
            request.order_type, request.volume, request.symbol
        );
        self.post("order_send", request).await
    }

    async fn last_error(&self) -> TerminalStatus {
        match self.post("last_error", &serde_json::json!({})).await {
            Ok(status) => status,
            Err(e) => TerminalStatus {
                code: -1,
                message: e.to_string(),
            },
        }
    }
}
