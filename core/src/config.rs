//! Client configuration loaded from `YD4B_*` environment variables.
//!
//! Precedence (lowest to highest):
//! 1. Programmatic defaults (`version = "v1"`, no partner id, no timeout)
//! 2. Environment variables with the `YD4B_` prefix
//!
//! `YD4B_ORIGIN`, `YD4B_CLIENT_ID`, `YD4B_CLIENT_SECRET` and `YD4B_CALLER_IP`
//! are required.

use std::collections::BTreeMap;

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Default API version path segment.
pub const DEFAULT_VERSION: &str = "v1";

/// Environment variable prefix read by [`ClientConfig::from_env`].
pub const ENV_PREFIX: &str = "YD4B_";

/// Keys taken verbatim from the environment. `Env` would otherwise turn
/// `12345` into an integer and `0042` into `42`.
const TEXT_KEYS: [&str; 6] = [
    "origin",
    "client_id",
    "client_secret",
    "caller_ip",
    "partner_id",
    "version",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load yd4b configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("configuration value `{0}` must not be empty")]
    Empty(&'static str),
}

/// Everything needed to build a `Yd4bClient`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme and host of the API server, e.g. `https://api.example.jp`.
    pub origin: String,
    pub client_id: String,
    pub client_secret: String,
    /// Global IP of the end user, forwarded as `x-forwarded-for`.
    pub caller_ip: String,
    /// Reseller identifier sent as `ec_uid`.
    #[serde(default)]
    pub partner_id: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,
    /// Whole-call timeout applied to the default network transport.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

/// Defaults merged underneath the environment. Required fields are absent so
/// that a missing variable surfaces as a load error.
#[derive(Serialize)]
struct Defaults {
    version: &'static str,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let text: BTreeMap<String, String> = Env::prefixed(ENV_PREFIX)
            .only(&TEXT_KEYS)
            .iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();

        let config: Self = Figment::new()
            .merge(Serialized::defaults(Defaults {
                version: DEFAULT_VERSION,
            }))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&TEXT_KEYS))
            .merge(Serialized::defaults(text))
            .extract()
            .map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations with blank required values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("origin", &self.origin),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("caller_ip", &self.caller_ip),
            ("version", &self.version),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Empty(name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [(&str, Option<&str>); 4] = [
        ("YD4B_ORIGIN", Some("https://api.example.jp")),
        ("YD4B_CLIENT_ID", Some("client-abc")),
        ("YD4B_CLIENT_SECRET", Some("secret-xyz")),
        ("YD4B_CALLER_IP", Some("203.0.113.7")),
    ];

    #[test]
    fn loads_required_values_and_defaults() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("YD4B_PARTNER_ID", None),
            ("YD4B_VERSION", None),
            ("YD4B_TIMEOUT_SECS", None),
        ]);
        temp_env::with_vars(vars, || {
            let config = ClientConfig::from_env().unwrap();
            assert_eq!(config.origin, "https://api.example.jp");
            assert_eq!(config.client_id, "client-abc");
            assert_eq!(config.client_secret, "secret-xyz");
            assert_eq!(config.caller_ip, "203.0.113.7");
            assert_eq!(config.partner_id, None);
            assert_eq!(config.version, "v1");
            assert_eq!(config.timeout_secs, None);
        });
    }

    #[test]
    fn environment_overrides_optional_values() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("YD4B_PARTNER_ID", Some("ec-partner")),
            ("YD4B_VERSION", Some("v2")),
            ("YD4B_TIMEOUT_SECS", Some("15")),
        ]);
        temp_env::with_vars(vars, || {
            let config = ClientConfig::from_env().unwrap();
            assert_eq!(config.partner_id.as_deref(), Some("ec-partner"));
            assert_eq!(config.version, "v2");
            assert_eq!(config.timeout_secs, Some(15));
        });
    }

    #[test]
    fn numeric_identifiers_stay_text() {
        let vars = [
            ("YD4B_ORIGIN", Some("https://api.example.jp")),
            ("YD4B_CLIENT_ID", Some("12345")),
            ("YD4B_CLIENT_SECRET", Some("0042")),
            ("YD4B_CALLER_IP", Some("203.0.113.7")),
            ("YD4B_PARTNER_ID", Some("007")),
            ("YD4B_VERSION", None),
            ("YD4B_TIMEOUT_SECS", Some("30")),
        ];
        temp_env::with_vars(vars, || {
            let config = ClientConfig::from_env().unwrap();
            assert_eq!(config.client_id, "12345");
            assert_eq!(config.client_secret, "0042");
            assert_eq!(config.partner_id.as_deref(), Some("007"));
            assert_eq!(config.timeout_secs, Some(30));
        });
    }

    #[test]
    fn missing_required_value_fails() {
        let mut vars = REQUIRED.to_vec();
        vars[0] = ("YD4B_ORIGIN", None);
        temp_env::with_vars(vars, || {
            let err = ClientConfig::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::Load(_)));
        });
    }

    #[test]
    fn blank_required_value_fails_validation() {
        let config = ClientConfig {
            origin: "https://api.example.jp".to_string(),
            client_id: " ".to_string(),
            client_secret: "secret".to_string(),
            caller_ip: "203.0.113.7".to_string(),
            partner_id: None,
            version: DEFAULT_VERSION.to_string(),
            timeout_secs: None,
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Empty("client_id")));
    }
}
