use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Signing secret for access tokens.
    pub secret_key: String,
    /// Gemini API key. Optional at startup: a missing key surfaces as a
    /// `Misconfigured` error on the first scoring call instead of a crash.
    pub gemini_api_key: Option<String>,
    /// Access token lifetime in minutes.
    pub token_ttl_minutes: i64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            secret_key: require_env("SECRET_KEY")?,
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            token_ttl_minutes: std::env::var("ACCESS_TOKEN_TTL_MINUTES")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<i64>()
                .context("ACCESS_TOKEN_TTL_MINUTES must be an integer")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
