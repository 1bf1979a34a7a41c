use crate::errors::ConfigError;
use std::{env, time::Duration};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub contacts_url: String,
    pub leads_url: String,
    pub request_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// `CONTACTS_URL` and `LEADS_URL` win over the collections derived from
    /// `SOURCE_BASE_URL`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match read("PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match read("SOURCE_TIMEOUT_SECS") {
            Some(value) => value.parse::<u64>().map_err(|_| ConfigError::Invalid {
                name: "SOURCE_TIMEOUT_SECS",
                value,
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let base = read("SOURCE_BASE_URL").map(|base| base.trim_end_matches('/').to_string());
        let collection = |name: &'static str, resource: &str| {
            read(name)
                .or_else(|| base.as_ref().map(|base| format!("{base}/{resource}")))
                .ok_or(ConfigError::Missing("SOURCE_BASE_URL"))
        };

        Ok(Self {
            port,
            contacts_url: collection("CONTACTS_URL", "contactos")?,
            leads_url: collection("LEADS_URL", "leads")?,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn derives_collection_urls_from_base() {
        let config = config(&[("SOURCE_BASE_URL", "https://sheets.example/v1/storages/abc/")]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.contacts_url, "https://sheets.example/v1/storages/abc/contactos");
        assert_eq!(config.leads_url, "https://sheets.example/v1/storages/abc/leads");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn explicit_urls_override_base() {
        let config = config(&[
            ("CONTACTS_URL", "http://127.0.0.1:9000/c"),
            ("LEADS_URL", "http://127.0.0.1:9000/l"),
            ("PORT", "3000"),
            ("SOURCE_TIMEOUT_SECS", "2"),
        ])
        .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.contacts_url, "http://127.0.0.1:9000/c");
        assert_eq!(config.leads_url, "http://127.0.0.1:9000/l");
        assert_eq!(config.request_timeout, Duration::from_secs(2));
    }

    #[test]
    fn missing_source_is_an_error() {
        assert!(matches!(config(&[]), Err(ConfigError::Missing("SOURCE_BASE_URL"))));
    }

    #[test]
    fn invalid_port_is_reported() {
        let err = config(&[("SOURCE_BASE_URL", "http://x"), ("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }
}
