//! HS256 bearer tokens.
//!
//! Tokens carry the same claim set the original web service issued
//! (`sub`, `iat`, `nbf`, `exp`, `jti`, `type`, `fresh`), so tokens minted by
//! either side verify on the other as long as the secret matches.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";
const ACCESS_TOKEN: &str = "access";

/// One year. Longer lifetimes are rejected at config load and on the CLI.
pub const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing Authorization Header")]
    MissingHeader,
    #[error("Bad Authorization header. Expected 'Authorization: Bearer <JWT>'")]
    BadHeader,
    #[error("Not enough segments")]
    NotEnoughSegments,
    #[error("Invalid token")]
    Malformed,
    #[error("Signature verification failed")]
    BadSignature,
    #[error("Token has expired")]
    Expired,
    #[error("The token is not yet valid (nbf)")]
    NotYetValid,
    #[error("Only non-refresh tokens are allowed")]
    WrongTokenType,
    #[error("Failed to sign token: {0}")]
    Signing(String),
    #[error("Token lifetime of {0} minutes is outside the allowed range")]
    InvalidTtl(i64),
}

impl AuthError {
    /// Whether the caller should re-authenticate (401) rather than fix the
    /// request (422).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::MissingHeader | Self::Expired)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub jti: String,
    #[serde(rename = "type")]
    pub token_type: String,
    #[serde(default)]
    pub fresh: bool,
}

/// Signs and verifies tokens with one shared secret.
#[derive(Clone)]
pub struct JwtAuthority {
    secret: Vec<u8>,
    ttl: Duration,
}

impl std::fmt::Debug for JwtAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuthority")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl JwtAuthority {
    pub fn new(secret: &str, ttl_minutes: i64) -> Result<Self, AuthError> {
        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&ttl_minutes) {
            return Err(AuthError::InvalidTtl(ttl_minutes));
        }
        let ttl = Duration::try_minutes(ttl_minutes).ok_or(AuthError::InvalidTtl(ttl_minutes))?;
        Ok(Self {
            secret: secret.as_bytes().to_vec(),
            ttl,
        })
    }

    fn mac(&self) -> Result<HmacSha256, AuthError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|e| AuthError::Signing(e.to_string()))
    }

    pub fn issue(&self, subject: &str) -> Result<String, AuthError> {
        self.issue_at(subject, Utc::now().timestamp())
    }

    fn issue_at(&self, subject: &str, now: i64) -> Result<String, AuthError> {
        let header = Header {
            alg: ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        };
        let exp = now
            .checked_add(self.ttl.num_seconds())
            .ok_or_else(|| AuthError::Signing("expiry overflows".to_string()))?;
        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            nbf: now,
            exp,
            jti: Uuid::new_v4().to_string(),
            token_type: ACCESS_TOKEN.to_string(),
            fresh: false,
        };

        let signing_input = format!(
            "{}.{}",
            encode_segment(&header)?,
            encode_segment(&claims)?
        );

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{}.{}", signing_input, signature))
    }

    /// Extracts and verifies the token from an `Authorization` header value.
    pub fn verify_header(&self, header: Option<&str>) -> Result<Claims, AuthError> {
        let header = header.ok_or(AuthError::MissingHeader)?;
        let token = match header.split_once(' ') {
            Some((scheme, token)) if scheme == "Bearer" && !token.trim().is_empty() => token.trim(),
            _ => return Err(AuthError::BadHeader),
        };
        self.verify(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    fn verify_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::NotEnoughSegments);
        };

        let header: Header = decode_segment(header_b64)?;
        if header.alg != ALGORITHM {
            return Err(AuthError::Malformed);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| AuthError::Malformed)?;
        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::BadSignature)?;

        let claims: Claims = decode_segment(claims_b64)?;
        if now >= claims.exp {
            return Err(AuthError::Expired);
        }
        if now < claims.nbf {
            return Err(AuthError::NotYetValid);
        }
        if claims.token_type != ACCESS_TOKEN {
            return Err(AuthError::WrongTokenType);
        }
        Ok(claims)
    }
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T, AuthError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::Malformed)
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, AuthError> {
    let bytes = serde_json::to_vec(value).map_err(|e| AuthError::Signing(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
