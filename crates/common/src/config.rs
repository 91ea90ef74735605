use std::collections::{HashMap, HashSet};
use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::auth::MAX_TOKEN_TTL_MINUTES;
use crate::models::Side;

pub const JWT_SECRET_ENV: &str = "JWT_SECRET_KEY";
pub const CONFIG_PATH_ENV: &str = "TRIGGER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Process-wide settings. Loaded once in `main`, validated, then only read.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    pub terminal: TerminalSettings,
    #[serde(default)]
    pub risk: RiskSettings,
    #[serde(default)]
    pub strategy: StrategySettings,
    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthSettings {
    pub jwt_secret: Option<String>,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: i64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_minutes: default_token_ttl(),
        }
    }
}

impl AuthSettings {
    /// Only valid after `AppConfig::validate` has run.
    pub fn secret(&self) -> &str {
        self.jwt_secret.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalKind {
    #[default]
    Paper,
    Bridge,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TerminalSettings {
    #[serde(default)]
    pub kind: TerminalKind,
    pub login: u64,
    pub password: String,
    pub server: String,
    pub path: Option<String>,
    pub timeout_ms: Option<u64>,
    pub bridge_url: Option<String>,
    pub bridge_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskSettings {
    #[serde(default)]
    pub submit_orders: bool,
    #[serde(default = "default_volume")]
    pub volume: f64,
    #[serde(default = "default_deviation")]
    pub deviation: u32,
    #[serde(default)]
    pub magic: u64,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            submit_orders: false,
            volume: default_volume(),
            deviation: default_deviation(),
            magic: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrategySettings {
    /// symbol -> side
    #[serde(default)]
    pub signals: HashMap<String, Side>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_token_ttl() -> i64 {
    15
}

fn default_volume() -> f64 {
    0.01
}

fn default_deviation() -> u32 {
    20
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Reads `path`, applies the `JWT_SECRET_KEY` override and validates.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&raw)?;
        config.override_secret(env::var(JWT_SECRET_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parses without validating.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn override_secret(&mut self, secret: Option<String>) {
        if let Some(secret) = secret.filter(|s| !s.is_empty()) {
            self.auth.jwt_secret = Some(secret);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::invalid("server.host", "must not be empty"));
        }
        match self.auth.jwt_secret.as_deref() {
            None | Some("") => {
                return Err(ConfigError::invalid(
                    "auth.jwt_secret",
                    format!("must be set in the file or via {}", JWT_SECRET_ENV),
                ));
            }
            Some(_) => {}
        }
        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&self.auth.token_ttl_minutes) {
            return Err(ConfigError::invalid(
                "auth.token_ttl_minutes",
                format!("must be between 1 and {}", MAX_TOKEN_TTL_MINUTES),
            ));
        }

        let terminal = &self.terminal;
        if terminal.login == 0 {
            return Err(ConfigError::invalid("terminal.login", "must be a non-zero account number"));
        }
        if terminal.password.is_empty() {
            return Err(ConfigError::invalid("terminal.password", "must not be empty"));
        }
        if terminal.server.trim().is_empty() {
            return Err(ConfigError::invalid("terminal.server", "must not be empty"));
        }
        if terminal.kind == TerminalKind::Bridge
            && terminal.bridge_url.as_deref().is_none_or(|u| u.trim().is_empty())
        {
            return Err(ConfigError::invalid(
                "terminal.bridge_url",
                "required when terminal.kind = \"bridge\"",
            ));
        }

        if !(self.risk.volume.is_finite() && self.risk.volume > 0.0) {
            return Err(ConfigError::invalid("risk.volume", "must be a positive number"));
        }
        let mut seen = HashSet::new();
        for symbol in self.strategy.signals.keys() {
            let key = symbol.trim().to_uppercase();
            if key.is_empty() {
                return Err(ConfigError::invalid("strategy.signals", "symbols must not be empty"));
            }
            if !seen.insert(key) {
                return Err(ConfigError::invalid(
                    "strategy.signals",
                    format!("symbol '{}' is listed more than once (symbols ignore case)", symbol.trim()),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [auth]
        jwt_secret = "file-secret"

        [terminal]
        login = 12345678
        password = "password"
        server = "broker-server"
    "#;

    #[test]
    fn minimal_file_gets_defaults() {
        let config = AppConfig::parse(MINIMAL).unwrap();
        config.validate().unwrap();

        assert_eq!(config.server.bind_address(), "127.0.0.1:5000");
        assert_eq!(config.auth.token_ttl_minutes, 15);
        assert_eq!(config.terminal.kind, TerminalKind::Paper);
        assert!(!config.risk.submit_orders);
        assert_eq!(config.risk.volume, 0.01);
        assert!(config.strategy.signals.is_empty());
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn env_secret_overrides_file_secret() {
        let mut config = AppConfig::parse(MINIMAL).unwrap();
        config.override_secret(Some("env-secret".to_string()));
        assert_eq!(config.auth.secret(), "env-secret");

        config.override_secret(Some(String::new()));
        assert_eq!(config.auth.secret(), "env-secret");
    }

    #[test]
    fn missing_secret_fails_validation() {
        let raw = MINIMAL.replace("jwt_secret = \"file-secret\"", "");
        let config = AppConfig::parse(&raw).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "auth.jwt_secret", .. }));
    }

    #[test]
    fn missing_terminal_section_is_a_parse_error() {
        let err = AppConfig::parse("[auth]\njwt_secret = \"x\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let raw = format!("{}\n[risk]\nlot_size = 1.0\n", MINIMAL);
        assert!(matches!(AppConfig::parse(&raw), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn bridge_requires_url() {
        let raw = MINIMAL.replace("login = 12345678", "kind = \"bridge\"\nlogin = 12345678");
        let config = AppConfig::parse(&raw).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "terminal.bridge_url", .. }));
    }

    #[test]
    fn non_positive_volume_is_rejected() {
        let raw = format!("{}\n[risk]\nvolume = 0.0\n", MINIMAL);
        let config = AppConfig::parse(&raw).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "risk.volume", .. })
        ));
    }

    #[test]
    fn strategy_table_is_parsed() {
        let raw = format!("{}\n[strategy.signals]\nEURUSD = \"buy\"\nGBPUSD = \"sell\"\n", MINIMAL);
        let config = AppConfig::parse(&raw).unwrap();
        config.validate().unwrap();
        assert_eq!(config.strategy.signals.get("EURUSD"), Some(&Side::Buy));
        assert_eq!(config.strategy.signals.get("GBPUSD"), Some(&Side::Sell));
    }

    #[test]
    fn unreadable_file_reports_path() {
        let err = AppConfig::load(Path::new("/nonexistent/trigger.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/trigger.toml"));
    }

    #[test]
    fn token_ttl_must_fit_the_allowed_range() {
        for ttl in [0, -5, MAX_TOKEN_TTL_MINUTES + 1, i64::MAX] {
            let raw = MINIMAL.replace(
                "jwt_secret = \"file-secret\"",
                &format!("jwt_secret = \"file-secret\"\ntoken_ttl_minutes = {}", ttl),
            );
            let config = AppConfig::parse(&raw).unwrap();
            let err = config.validate().unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { field: "auth.token_ttl_minutes", .. }),
                "ttl {} should be rejected, got {}",
                ttl,
                err
            );
        }
    }

    #[test]
    fn symbols_differing_only_in_case_are_rejected() {
        let raw = format!("{}\n[strategy.signals]\neurusd = \"buy\"\nEURUSD = \"sell\"\n", MINIMAL);
        let config = AppConfig::parse(&raw).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "strategy.signals", .. }));
        assert!(err.to_string().contains("more than once"));
    }
}
