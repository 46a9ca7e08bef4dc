//! Process configuration, read from environment variables.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use chrono::Duration;
use secrecy::SecretString;
use thiserror::Error;

use catalog_auth::DEFAULT_TOKEN_TTL_SECS;
use catalog_observability::LogFormat;

pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("ADMIN_USERNAME and ADMIN_PASSWORD must be set together")]
    PartialAdmin,
}

/// Credentials for the admin account created at startup.
#[derive(Debug)]
pub struct AdminBootstrap {
    pub username: String,
    pub password: SecretString,
}

#[derive(Debug)]
pub struct ApiConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub jwt_secret: SecretString,
    pub token_ttl: Duration,
    /// Postgres connection string; `None` selects the in-memory store.
    pub database_url: Option<SecretString>,
    pub admin: Option<AdminBootstrap>,
    pub log_format: LogFormat,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let token_ttl = match get("TOKEN_TTL_SECS") {
            Some(raw) => {
                let secs: i64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    var: "TOKEN_TTL_SECS",
                    reason: format!("'{raw}' is not an integer"),
                })?;
                if secs <= 0 {
                    return Err(ConfigError::Invalid {
                        var: "TOKEN_TTL_SECS",
                        reason: "must be positive".to_string(),
                    });
                }
                secs
            }
            None => DEFAULT_TOKEN_TTL_SECS,
        };

        let bind_addr = match get("BIND_ADDR") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "BIND_ADDR",
                reason: format!("'{raw}' is not an IP address"),
            })?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                reason: format!("'{raw}' is not a port number"),
            })?,
            None => DEFAULT_PORT,
        };

        let log_format = match get("LOG_FORMAT") {
            Some(raw) => raw.parse().map_err(|e: catalog_observability::UnknownLogFormat| {
                ConfigError::Invalid {
                    var: "LOG_FORMAT",
                    reason: e.to_string(),
                }
            })?,
            None => LogFormat::default(),
        };

        let admin = match (get("ADMIN_USERNAME"), get("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(AdminBootstrap {
                username: username.trim().to_string(),
                password: SecretString::from(password),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialAdmin),
        };

        Ok(Self {
            bind_addr,
            port,
            jwt_secret: SecretString::from(jwt_secret),
            token_ttl: Duration::seconds(token_ttl),
            database_url: get("DATABASE_URL").map(SecretString::from),
            admin,
            log_format,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let cfg = ApiConfig::from_lookup(lookup(&[("JWT_SECRET", "s")])).unwrap();
        assert_eq!(cfg.socket_addr().to_string(), "0.0.0.0:5000");
        assert_eq!(cfg.token_ttl, Duration::seconds(3600));
        assert!(cfg.database_url.is_none());
        assert!(cfg.admin.is_none());
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.jwt_secret.expose_secret(), "s");
    }

    #[test]
    fn secret_is_required() {
        let err = ApiConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));

        let err = ApiConfig::from_lookup(lookup(&[("JWT_SECRET", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = ApiConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s"),
            ("PORT", "8081"),
            ("BIND_ADDR", "127.0.0.1"),
            ("TOKEN_TTL_SECS", "60"),
            ("LOG_FORMAT", "pretty"),
            ("DATABASE_URL", "postgres://localhost/catalog"),
            ("ADMIN_USERNAME", "root"),
            ("ADMIN_PASSWORD", "pw"),
        ]))
        .unwrap();
        assert_eq!(cfg.socket_addr().to_string(), "127.0.0.1:8081");
        assert_eq!(cfg.token_ttl, Duration::seconds(60));
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert!(cfg.database_url.is_some());
        assert_eq!(cfg.admin.map(|a| a.username), Some("root".to_string()));
    }

    #[test]
    fn invalid_values_are_reported() {
        for (var, value) in [("PORT", "http"), ("TOKEN_TTL_SECS", "0"), ("BIND_ADDR", "nowhere"), ("LOG_FORMAT", "xml")] {
            let err = ApiConfig::from_lookup(lookup(&[("JWT_SECRET", "s"), (var, value)])).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { var: v, .. } if v == var), "{var}: {err}");
        }
    }

    #[test]
    fn admin_credentials_come_in_pairs() {
        let err = ApiConfig::from_lookup(lookup(&[("JWT_SECRET", "s"), ("ADMIN_USERNAME", "root")])).unwrap_err();
        assert_eq!(err, ConfigError::PartialAdmin);
    }
}
