use crate::error::ConfigError;
use crate::service::{EmptyPatchPolicy, ServiceOptions};
use std::net::SocketAddr;
use std::str::FromStr;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// Which persistence backend serves the gateway.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StoreBackend {
    #[default]
    Postgres,
    /// In-process tables; state is lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("expected postgres or memory, got {}", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    /// Required for the postgres backend only.
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
    pub backend: StoreBackend,
    pub empty_patch: EmptyPatchPolicy,
    pub max_page_size: u32,
}

impl Settings {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend: StoreBackend = parse(&get, "STORE_BACKEND")?.unwrap_or_default();
        let database_url = get("DATABASE_URL");
        if backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        let bind_addr = match parse(&get, "BIND_ADDR")? {
            Some(addr) => addr,
            None => parse_value("BIND_ADDR", DEFAULT_BIND_ADDR)?,
        };
        let db_max_connections =
            parse(&get, "DB_MAX_CONNECTIONS")?.unwrap_or(DEFAULT_MAX_CONNECTIONS);
        let empty_patch: EmptyPatchPolicy = parse(&get, "EMPTY_PATCH_POLICY")?.unwrap_or_default();
        let max_page_size: u32 = parse(&get, "MAX_PAGE_SIZE")?.unwrap_or(DEFAULT_MAX_PAGE_SIZE);
        if max_page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "MAX_PAGE_SIZE",
                value: "0".into(),
            });
        }

        Ok(Settings {
            database_url,
            bind_addr,
            db_max_connections,
            backend,
            empty_patch,
            max_page_size,
        })
    }

    pub fn service_options(&self) -> ServiceOptions {
        ServiceOptions {
            empty_patch: self.empty_patch,
            max_page_size: self.max_page_size,
        }
    }
}

fn parse<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    get(key).map(|raw| parse_value(key, &raw)).transpose()
}

fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let s = settings(&[("DATABASE_URL", "postgres://localhost/shop")]).unwrap();
        assert_eq!(s.backend, StoreBackend::Postgres);
        assert_eq!(s.bind_addr.port(), 8080);
        assert_eq!(s.db_max_connections, 5);
        assert_eq!(s.empty_patch, EmptyPatchPolicy::Touch);
        assert_eq!(s.max_page_size, 100);
    }

    #[test]
    fn postgres_needs_a_database_url() {
        assert!(matches!(settings(&[]), Err(ConfigError::Missing("DATABASE_URL"))));
        let s = settings(&[("STORE_BACKEND", "memory")]).unwrap();
        assert_eq!(s.backend, StoreBackend::Memory);
        assert!(s.database_url.is_none());
    }

    #[test]
    fn invalid_values_name_the_key() {
        let err = settings(&[("STORE_BACKEND", "memory"), ("MAX_PAGE_SIZE", "lots")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "MAX_PAGE_SIZE", .. }));
        let err = settings(&[("STORE_BACKEND", "memory"), ("EMPTY_PATCH_POLICY", "ignore")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "EMPTY_PATCH_POLICY", .. }));
    }

    #[test]
    fn skip_policy_is_parsed() {
        let s = settings(&[("STORE_BACKEND", "Memory"), ("EMPTY_PATCH_POLICY", "SKIP")]).unwrap();
        assert_eq!(s.service_options().empty_patch, EmptyPatchPolicy::Skip);
    }
}
