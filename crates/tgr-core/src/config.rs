use std::{env, path::PathBuf};

use crate::{errors::Error, Result};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SESSION_DIR: &str = "sessions";

/// Telegram application credentials plus the account to sign in as.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub api_id: i32,
    pub api_hash: String,
    pub phone: String,
    /// Two-step verification password. When unset it is asked for on stdin.
    pub password: Option<String>,
}

/// Typed configuration, read from the environment.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub api_id: i32,
    pub api_hash: String,
    pub phone: String,
    pub password: Option<String>,

    // HTTP
    pub host: String,
    pub port: u16,

    // Persistence
    pub session_dir: PathBuf,
}

impl Config {
    /// Read the process environment. Call [`load_dotenv`] first to pick up `.env`.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the process env in production).
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env_str = |key: &str| get(key).and_then(non_empty);

        // Required env vars
        let api_id = env_str("TELEGRAM_API_ID").ok_or_else(|| {
            Error::Config("TELEGRAM_API_ID environment variable is required".to_string())
        })?;
        let api_id = api_id.trim().parse::<i32>().map_err(|_| {
            Error::Config(format!("TELEGRAM_API_ID must be an integer, got {api_id:?}"))
        })?;
        let api_hash = env_str("TELEGRAM_API_HASH").ok_or_else(|| {
            Error::Config("TELEGRAM_API_HASH environment variable is required".to_string())
        })?;
        let phone = env_str("TELEGRAM_PHONE").ok_or_else(|| {
            Error::Config("TELEGRAM_PHONE environment variable is required".to_string())
        })?;
        let password = env_str("TELEGRAM_PASSWORD");

        let host = env_str("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match env_str("PORT") {
            Some(raw) => parse_port(&raw)?,
            None => DEFAULT_PORT,
        };

        let session_dir = PathBuf::from(
            env_str("SESSION_DIR").unwrap_or_else(|| DEFAULT_SESSION_DIR.to_string()),
        );

        Ok(Self {
            api_id,
            api_hash: api_hash.trim().to_string(),
            phone: phone.trim().to_string(),
            password,
            host,
            port,
            session_dir,
        })
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            api_id: self.api_id,
            api_hash: self.api_hash.clone(),
            phone: self.phone.clone(),
            password: self.password.clone(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Load `.env` from the working directory without overriding the environment.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

fn parse_port(raw: &str) -> Result<u16> {
    raw.trim()
        .parse::<u16>()
        .map_err(|_| Error::Config(format!("PORT must be a port number, got {raw:?}")))
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("TELEGRAM_API_ID", "12345"),
        ("TELEGRAM_API_HASH", "abcdef"),
        ("TELEGRAM_PHONE", "+15550001111"),
    ];

    #[test]
    fn defaults_apply_when_only_required_vars_are_set() {
        let cfg = Config::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(cfg.api_id, 12345);
        assert_eq!(cfg.api_hash, "abcdef");
        assert_eq!(cfg.phone, "+15550001111");
        assert_eq!(cfg.password, None);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:3000");
        assert_eq!(cfg.session_dir, PathBuf::from("sessions"));
    }

    #[test]
    fn overrides_are_read() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("SESSION_DIR", "/var/lib/tgr"),
            ("TELEGRAM_PASSWORD", "hunter2"),
        ]);
        let cfg = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(cfg.bind_addr(), "127.0.0.1:8080");
        assert_eq!(cfg.session_dir, PathBuf::from("/var/lib/tgr"));
        assert_eq!(cfg.credentials().password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn missing_phone_is_a_config_error() {
        let err = Config::from_lookup(lookup(&REQUIRED[..2])).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("TELEGRAM_PHONE")));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut pairs = REQUIRED.to_vec();
        pairs[1] = ("TELEGRAM_API_HASH", "   ");
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("TELEGRAM_API_HASH")));
    }

    #[test]
    fn non_numeric_api_id_and_port_are_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs[0] = ("TELEGRAM_API_ID", "abc");
        assert!(Config::from_lookup(lookup(&pairs)).is_err());

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "70000"));
        assert!(Config::from_lookup(lookup(&pairs)).is_err());
    }
}
