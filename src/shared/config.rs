use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:3001";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub sync: SyncConfig,
    pub cache: CacheConfig,
    pub connectivity: ConnectivityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Seconds before an in-flight request is abandoned
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Run a flush pass at startup and on every reconnect
    pub auto_sync: bool,
    /// When set, an order that fails this many times is moved to `failed`
    pub max_attempts: Option<u32>,
    #[serde(default = "default_operation_routes")]
    pub operation_routes: Vec<OperationRoute>,
}

/// Maps a queued operation type onto the endpoint that accepts it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperationRoute {
    pub op_type: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub storage_key: String,
    pub max_age_hours: u64,
    pub stale_time_secs: u64,
    pub gc_time_hours: u64,
    pub buster: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    pub probe_path: String,
    pub probe_interval: u64,
    pub probe_timeout: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: default_database_url(),
                max_connections: 5,
                connection_timeout: 30,
            },
            api: ApiConfig {
                base_url: DEFAULT_API_URL.to_string(),
                request_timeout: 10,
            },
            sync: SyncConfig {
                auto_sync: true,
                max_attempts: None,
                operation_routes: default_operation_routes(),
            },
            cache: CacheConfig {
                storage_key: "query-cache".to_string(),
                max_age_hours: 24,
                stale_time_secs: 300, // 5 minutes
                gc_time_hours: 24,
                buster: String::new(),
            },
            connectivity: ConnectivityConfig {
                probe_path: "/health".to_string(),
                probe_interval: 15,
                probe_timeout: 3,
            },
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl CacheConfig {
    pub fn max_age(&self) -> chrono::Duration {
        chrono::Duration::hours(self.max_age_hours as i64)
    }

    pub fn stale_time(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.stale_time_secs as i64)
    }

    pub fn gc_time(&self) -> chrono::Duration {
        chrono::Duration::hours(self.gc_time_hours as i64)
    }
}

impl ConnectivityConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 環境変数の取得元を差し替えられる版（テスト用）
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("LUNCH_DATABASE_URL")
            && !v.trim().is_empty()
        {
            cfg.database.url = v.trim().to_string();
        }
        if let Some(v) = lookup("LUNCH_API_URL")
            && !v.trim().is_empty()
        {
            cfg.api.base_url = v.trim().trim_end_matches('/').to_string();
        }
        if let Some(v) = lookup("LUNCH_REQUEST_TIMEOUT_SECS")
            && let Some(value) = parse_u64(&v)
        {
            cfg.api.request_timeout = value.max(1);
        }
        if let Some(v) = lookup("LUNCH_AUTO_SYNC") {
            cfg.sync.auto_sync = parse_bool(&v, cfg.sync.auto_sync);
        }
        if let Some(v) = lookup("LUNCH_SYNC_MAX_ATTEMPTS") {
            // 0 または空文字は「上限なし」
            cfg.sync.max_attempts = parse_u64(&v)
                .filter(|value| *value > 0)
                .map(|value| value.min(u32::MAX as u64) as u32);
        }
        if let Some(v) = lookup("LUNCH_CACHE_MAX_AGE_HOURS")
            && let Some(value) = parse_u64(&v)
        {
            cfg.cache.max_age_hours = value.max(1);
        }
        if let Some(v) = lookup("LUNCH_CACHE_BUSTER") {
            cfg.cache.buster = v.trim().to_string();
        }
        if let Some(v) = lookup("LUNCH_PROBE_INTERVAL_SECS")
            && let Some(value) = parse_u64(&v)
        {
            cfg.connectivity.probe_interval = value.max(1);
        }
        if let Some(v) = lookup("LUNCH_PROBE_PATH")
            && !v.trim().is_empty()
        {
            cfg.connectivity.probe_path = v.trim().to_string();
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.database.url.trim().is_empty() {
            return Err("Database url must not be empty".to_string());
        }
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://"))
        {
            return Err(format!(
                "API base_url must be an http(s) URL: {}",
                self.api.base_url
            ));
        }
        if self.api.request_timeout == 0 {
            return Err("API request_timeout must be greater than 0".to_string());
        }
        if let Some(0) = self.sync.max_attempts {
            return Err("Sync max_attempts must be greater than 0 when set".to_string());
        }
        if self.cache.storage_key.trim().is_empty() {
            return Err("Cache storage_key must not be empty".to_string());
        }
        if self.cache.max_age_hours == 0 {
            return Err("Cache max_age_hours must be greater than 0".to_string());
        }
        if !self.connectivity.probe_path.starts_with('/') {
            return Err("Connectivity probe_path must start with '/'".to_string());
        }
        if self.connectivity.probe_interval == 0 {
            return Err("Connectivity probe_interval must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn default_operation_routes() -> Vec<OperationRoute> {
    vec![OperationRoute {
        op_type: "reservation.create".to_string(),
        path: "/reservations".to_string(),
    }]
}

fn default_database_url() -> String {
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("./data"))
        .join("lunch-offline")
        .join("offline.db");
    format!("sqlite://{}?mode=rwc", path.display())
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let cfg = AppConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.api.base_url, "http://localhost:3001");
        assert_eq!(cfg.api.request_timeout, 10);
        assert_eq!(cfg.cache.max_age_hours, 24);
        assert!(cfg.sync.max_attempts.is_none());
        assert!(cfg.database.url.ends_with("offline.db?mode=rwc"));
    }

    #[test]
    fn test_from_lookup_applies_overrides() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("LUNCH_API_URL", "https://lunch.example.com/"),
            ("LUNCH_DATABASE_URL", "sqlite::memory:"),
            ("LUNCH_AUTO_SYNC", "off"),
            ("LUNCH_SYNC_MAX_ATTEMPTS", "5"),
            ("LUNCH_REQUEST_TIMEOUT_SECS", "0"),
            ("LUNCH_CACHE_BUSTER", " v2 "),
        ]));

        assert_eq!(cfg.api.base_url, "https://lunch.example.com");
        assert_eq!(cfg.database.url, "sqlite::memory:");
        assert!(!cfg.sync.auto_sync);
        assert_eq!(cfg.sync.max_attempts, Some(5));
        assert_eq!(cfg.api.request_timeout, 1);
        assert_eq!(cfg.cache.buster, "v2");
    }

    #[test]
    fn test_zero_max_attempts_means_unlimited() {
        let cfg = AppConfig::from_lookup(lookup_from(&[("LUNCH_SYNC_MAX_ATTEMPTS", "0")]));
        assert!(cfg.sync.max_attempts.is_none());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut cfg = AppConfig::default();
        cfg.api.base_url = "localhost:3001".to_string();
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.sync.max_attempts = Some(0);
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.connectivity.probe_path = "health".to_string();
        assert!(cfg.validate().is_err());
    }
}
