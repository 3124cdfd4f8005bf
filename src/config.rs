use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub namespace: String,
    pub session_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub record_api_url: String,
    pub storage: StorageConfig,
    pub login_latency: Duration,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let storage = StorageConfig {
            namespace: std::env::var("STORAGE_NAMESPACE").unwrap_or_else(|_| "ncvet_".into()),
            session_file: std::env::var("SESSION_FILE").ok().map(PathBuf::from),
        };
        let port = match std::env::var("APP_PORT") {
            Ok(v) => v.parse::<u16>()?,
            Err(_) => 8080,
        };
        Ok(Self {
            record_api_url: std::env::var("RECORD_API_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            storage,
            login_latency: parse_millis(std::env::var("LOGIN_LATENCY_MS").ok().as_deref(), 2000),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
        })
    }
}

fn parse_millis(raw: Option<&str>, default_ms: u64) -> Duration {
    let ms = raw
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default_ms);
    Duration::from_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_millis_falls_back_on_missing_or_garbage() {
        assert_eq!(parse_millis(None, 2000), Duration::from_millis(2000));
        assert_eq!(parse_millis(Some("soon"), 2000), Duration::from_millis(2000));
        assert_eq!(parse_millis(Some(" 0 "), 2000), Duration::ZERO);
        assert_eq!(parse_millis(Some("750"), 2000), Duration::from_millis(750));
    }
}
