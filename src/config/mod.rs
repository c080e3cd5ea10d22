use crate::core::{AppError, Result, RoundingPolicy};
use crate::modules::taxes::models::{DocumentTaxSettings, TaxMode};
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    /// "json" for machine-readable logs, anything else for plain text
    pub log_format: String,
    pub default_tax_rate: Decimal,
    pub default_tax_mode: TaxMode,
    pub default_rounding_policy: RoundingPolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(AppConfig {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
            default_tax_rate: env_or("DEFAULT_TAX_RATE", "10")?,
            default_tax_mode: env_or("DEFAULT_TAX_MODE", "exclusive")?,
            default_rounding_policy: env_or("DEFAULT_ROUNDING_POLICY", "floor")?,
        })
    }

    /// Tax settings used when a document request omits them
    pub fn tax_defaults(&self) -> DocumentTaxSettings {
        DocumentTaxSettings::new(
            self.default_tax_mode,
            self.default_tax_rate,
            self.default_rounding_policy,
        )
    }
}

/// Read an environment variable, falling back to `default`, and parse it
pub(crate) fn env_or<T: FromStr>(key: &str, default: &str) -> Result<T> {
    parse_setting(key, &env::var(key).unwrap_or_else(|_| default.to_string()))
}

pub(crate) fn parse_setting<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Configuration(format!("Invalid {}: '{}'", key, raw)))
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.app
            .tax_defaults()
            .validate()
            .map_err(|e| AppError::Configuration(format!("DEFAULT_TAX_RATE: {}", e)))?;

        if self.database.max_connections == 0 {
            return Err(AppError::Configuration(
                "Database max connections must be greater than 0".to_string(),
            ));
        }

        if self.database.pool_size > self.database.max_connections {
            return Err(AppError::Configuration(
                "Database pool size cannot exceed max connections".to_string(),
            ));
        }

        if self.server.workers == 0 {
            return Err(AppError::Configuration(
                "Server workers must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
