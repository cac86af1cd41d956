//! Process configuration
//!
//! Read once at startup from the environment (after `.env` is loaded).

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::{AuthConfig, TokenAlgorithm};

/// Server settings
#[derive(Clone)]
pub struct Settings {
    pub app_name: String,
    pub debug_mode: bool,
    pub secret_key: String,
    pub token_algorithm: TokenAlgorithm,
    pub access_token_ttl: Duration,
    pub password_pepper: Option<String>,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let secret_key = get("APP_SECRET_KEY").context("APP_SECRET_KEY must be set")?;

        let token_algorithm = match get("JWT_ALGORITHM") {
            Some(raw) => raw.parse().context("Invalid JWT_ALGORITHM")?,
            None => TokenAlgorithm::default(),
        };

        let minutes: u64 = match get("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(raw) => raw
                .parse()
                .context("ACCESS_TOKEN_EXPIRE_MINUTES must be a whole number of minutes")?,
            None => 30,
        };
        if minutes == 0 {
            bail!("ACCESS_TOKEN_EXPIRE_MINUTES must be greater than 0");
        }

        let database_max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            None => 5,
        };

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8000".to_string())
            .parse()
            .context("BIND_ADDR must be host:port")?;

        let frontend_origins = get("FRONTEND_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Self {
            app_name: get("APP_NAME").unwrap_or_else(|| "Scammer Registry".to_string()),
            debug_mode: match get("DEBUG_MODE") {
                Some(raw) => parse_bool(&raw).context("DEBUG_MODE must be true or false")?,
                None => false,
            },
            secret_key,
            token_algorithm,
            access_token_ttl: Duration::from_secs(minutes * 60),
            password_pepper: get("PASSWORD_PEPPER"),
            database_url: get("DATABASE_URL"),
            database_max_connections,
            bind_addr,
            frontend_origins,
        })
    }

    /// Auth configuration handed to the auth crate
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            token_secret: self.secret_key.as_bytes().to_vec(),
            token_algorithm: self.token_algorithm,
            access_token_ttl: self.access_token_ttl,
            password_pepper: self.password_pepper.as_ref().map(|p| p.as_bytes().to_vec()),
        }
    }

    /// Log filter used when `RUST_LOG` is unset
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug_mode {
            "api=debug,auth=debug,scammer=debug,platform=debug,tower_http=debug"
        } else {
            "api=info,auth=info,scammer=info,platform=info,tower_http=info"
        }
    }

    /// `*` alone means any origin
    pub fn allows_any_origin(&self) -> bool {
        self.frontend_origins.iter().any(|o| o == "*")
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("app_name", &self.app_name)
            .field("debug_mode", &self.debug_mode)
            .field("secret_key", &"[REDACTED]")
            .field("token_algorithm", &self.token_algorithm)
            .field("access_token_ttl", &self.access_token_ttl)
            .field(
                "password_pepper",
                &self.password_pepper.as_ref().map(|_| "[REDACTED]"),
            )
            .field("database", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("database_max_connections", &self.database_max_connections)
            .field("bind_addr", &self.bind_addr)
            .field("frontend_origins", &self.frontend_origins)
            .finish()
    }
}

fn parse_bool(raw: &str) -> anyhow::Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => bail!("unrecognised boolean {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> anyhow::Result<Settings> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[("APP_SECRET_KEY", "s3cret")]).unwrap();
        assert_eq!(s.app_name, "Scammer Registry");
        assert!(!s.debug_mode);
        assert_eq!(s.token_algorithm, TokenAlgorithm::Hs256);
        assert_eq!(s.access_token_ttl, Duration::from_secs(1800));
        assert!(s.database_url.is_none());
        assert_eq!(s.database_max_connections, 5);
        assert_eq!(s.bind_addr.port(), 8000);
        assert!(s.allows_any_origin());
    }

    #[test]
    fn test_secret_required() {
        assert!(settings(&[]).is_err());
        assert!(settings(&[("APP_SECRET_KEY", "  ")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let s = settings(&[
            ("APP_SECRET_KEY", "s3cret"),
            ("DEBUG_MODE", "True"),
            ("JWT_ALGORITHM", "HS512"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "60"),
            ("PASSWORD_PEPPER", "pepper"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("FRONTEND_ORIGINS", "http://a.example, http://b.example"),
        ])
        .unwrap();
        assert!(s.debug_mode);
        assert!(s.default_log_filter().contains("scammer=debug"));
        assert_eq!(s.token_algorithm, TokenAlgorithm::Hs512);
        assert_eq!(s.frontend_origins, vec!["http://a.example", "http://b.example"]);
        assert!(!s.allows_any_origin());

        let auth = s.auth_config();
        assert_eq!(auth.token_secret, b"s3cret".to_vec());
        assert_eq!(auth.access_token_ttl, Duration::from_secs(3600));
        assert_eq!(auth.password_pepper.as_deref(), Some(&b"pepper"[..]));
    }

    #[test]
    fn test_invalid_values() {
        assert!(settings(&[("APP_SECRET_KEY", "k"), ("JWT_ALGORITHM", "RS256")]).is_err());
        assert!(settings(&[("APP_SECRET_KEY", "k"), ("ACCESS_TOKEN_EXPIRE_MINUTES", "0")]).is_err());
        assert!(settings(&[("APP_SECRET_KEY", "k"), ("DEBUG_MODE", "maybe")]).is_err());
        assert!(settings(&[("APP_SECRET_KEY", "k"), ("BIND_ADDR", "nowhere")]).is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let s = settings(&[("APP_SECRET_KEY", "s3cret"), ("PASSWORD_PEPPER", "pepper")]).unwrap();
        let debug = format!("{:?}", s);
        assert!(!debug.contains("s3cret"));
        assert!(!debug.contains("pepper\""));
    }
}
