use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub worker_base_url: String,
    pub worker_generate_endpoint: String,
    /// Sent to the worker on outbound calls
    pub worker_service_token: String,
    /// Expected from the worker on its callbacks
    pub worker_accept_token: String,
    pub worker_timeout: Duration,
    pub expo_access_token: Option<String>,
    pub blob_root: String,
    pub blob_public_base_url: String,
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
        let worker_timeout_secs =
            env::var("WORKER_TIMEOUT_SECS").unwrap_or_else(|_| "10".to_string());

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: port.parse().context("PORT must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "storypool".to_string()),
            worker_base_url: env::var("WORKER_BASE_URL")
                .context("WORKER_BASE_URL must be set")?,
            worker_generate_endpoint: env::var("WORKER_GENERATE_ENDPOINT")
                .unwrap_or_else(|_| "/fairytale/generate".to_string()),
            worker_service_token: env::var("WORKER_SERVICE_TOKEN")
                .context("WORKER_SERVICE_TOKEN must be set")?,
            worker_accept_token: env::var("WORKER_ACCEPT_TOKEN")
                .context("WORKER_ACCEPT_TOKEN must be set")?,
            worker_timeout: Duration::from_secs(
                worker_timeout_secs
                    .parse()
                    .context("WORKER_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            expo_access_token: env::var("EXPO_ACCESS_TOKEN").ok().filter(|t| !t.is_empty()),
            blob_root: env::var("BLOB_ROOT").unwrap_or_else(|_| "./uploads".to_string()),
            blob_public_base_url: env::var("BLOB_PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080/uploads".to_string()),
            allowed_origins: parse_origins(&env::var("ALLOWED_ORIGINS").unwrap_or_default()),
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_split_and_trimmed() {
        assert_eq!(
            parse_origins(" https://a.app, https://b.app ,,"),
            vec!["https://a.app".to_string(), "https://b.app".to_string()]
        );
        assert!(parse_origins("").is_empty());
    }
}
