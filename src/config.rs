//! Configuration management

use std::path::PathBuf;

use anyhow::{self, Context, Result};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// NATS server URL
    pub nats_url: String,

    /// PostgreSQL connection string
    pub database_url: String,

    /// JWT secret for validating desk tokens; only the server needs it
    pub jwt_secret: Option<String>,

    /// Directory behind `/files/...` references
    pub site_files_dir: PathBuf,

    /// Directory behind `/private/files/...` references
    pub site_private_files_dir: PathBuf,

    /// Log files and the persisted import error log
    pub logs_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let nats_url = std::env::var("NATS_URL")
            .unwrap_or_else(|_| "nats://localhost:4222".to_string());

        let database_url = std::env::var("DATABASE_URL")
            .context("DATABASE_URL must be set")?;

        let jwt_secret = std::env::var("JWT_SECRET").ok();
        if let Some(secret) = &jwt_secret {
            validate_jwt_secret(secret)?;
        }

        Ok(Self {
            nats_url,
            database_url,
            jwt_secret,
            site_files_dir: path_var("SITE_FILES_DIR", "./sites/files"),
            site_private_files_dir: path_var("SITE_PRIVATE_FILES_DIR", "./sites/private/files"),
            logs_dir: logs_dir(),
        })
    }

    /// JWT secret, required when serving NATS requests
    pub fn require_jwt_secret(&self) -> Result<&str> {
        self.jwt_secret
            .as_deref()
            .context("JWT_SECRET must be set. Generate one with: openssl rand -base64 48")
    }

    /// File backing the import error log
    pub fn error_log_path(&self) -> PathBuf {
        self.logs_dir.join("import-errors.json")
    }
}

/// Logs directory, readable before the rest of the configuration
pub fn logs_dir() -> PathBuf {
    path_var("LOGS_DIR", "../logs")
}

fn path_var(name: &str, default: &str) -> PathBuf {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
        .into()
}

fn validate_jwt_secret(secret: &str) -> Result<()> {
    if secret.len() < 32 {
        anyhow::bail!(
            "JWT_SECRET must be at least 32 bytes (current: {} bytes). Generate one with: openssl rand -base64 48",
            secret.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_jwt_secret_is_rejected() {
        let err = validate_jwt_secret("too-short").unwrap_err();
        assert!(err.to_string().contains("at least 32 bytes"));
        assert!(validate_jwt_secret("a-secret-that-is-long-enough-for-hs256").is_ok());
    }

    #[test]
    fn test_missing_jwt_secret_is_an_error_only_when_required() {
        let config = Config {
            nats_url: "nats://localhost:4222".to_string(),
            database_url: "postgres://test".to_string(),
            jwt_secret: None,
            site_files_dir: "./sites/files".into(),
            site_private_files_dir: "./sites/private/files".into(),
            logs_dir: "../logs".into(),
        };
        assert!(config.require_jwt_secret().is_err());
        assert_eq!(config.error_log_path(), PathBuf::from("../logs/import-errors.json"));
    }

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_site_dirs_default_when_not_set() {
        std::env::remove_var("SITE_FILES_DIR");
        std::env::remove_var("SITE_PRIVATE_FILES_DIR");
        std::env::set_var("DATABASE_URL", "postgres://test");

        let config = Config::from_env().unwrap();
        assert_eq!(config.site_files_dir, PathBuf::from("./sites/files"));
        assert_eq!(config.site_private_files_dir, PathBuf::from("./sites/private/files"));
    }
}
