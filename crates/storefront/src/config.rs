//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_CATALOG_PATH` - Catalog JSON file (default: embedded catalog)
//! - `STOREFRONT_CART_STORE` - Cart storage backend, `memory` or `file` (default: file)
//! - `STOREFRONT_DATA_DIR` - Directory for the file backend (default: .data)
//! - `STOREFRONT_SIMULATED_LATENCY_MS` - Mock network delay per call (default: 0)
//! - `STOREFRONT_CURRENCY` - ISO 4217 currency code (default: USD)
//! - `STOREFRONT_FREE_SHIPPING_THRESHOLD` - Subtotal above which shipping is free (default: 100)
//! - `STOREFRONT_FLAT_SHIPPING_FEE` - Shipping fee below the threshold (default: 9.99)
//! - `STOREFRONT_TAX_RATE` - Tax rate as a fraction (default: 0.08)
//! - `STOREFRONT_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use ethereal_cart_core::CurrencyCode;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Invalid pricing configuration: {0}")]
    InvalidPricing(String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Catalog JSON file; `None` uses the embedded catalog
    pub catalog_path: Option<PathBuf>,
    /// Cart storage backend
    pub cart_store: CartStoreKind,
    /// Directory for the file-backed cart store
    pub data_dir: PathBuf,
    /// Artificial delay applied to every service call
    pub simulated_latency: Duration,
    /// Order total settings
    pub pricing: PricingConfig,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Cart storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CartStoreKind {
    /// Process memory; the cart is lost on restart.
    Memory,
    /// One JSON file per key under the data directory.
    #[default]
    File,
}

impl FromStr for CartStoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            _ => Err(format!("expected `memory` or `file`, got `{s}`")),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("expected `pretty` or `json`, got `{s}`")),
        }
    }
}

/// Order total settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingConfig {
    /// Currency all catalog prices are expressed in
    pub currency: CurrencyCode,
    /// Shipping is free when the subtotal is strictly above this amount
    pub free_shipping_threshold: Decimal,
    /// Shipping fee charged otherwise
    pub flat_shipping_fee: Decimal,
    /// Tax rate applied to the subtotal (0.08 = 8%)
    pub tax_rate: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: CurrencyCode::USD,
            free_shipping_threshold: Decimal::new(100, 0),
            flat_shipping_fee: Decimal::new(999, 2),
            tax_rate: Decimal::new(8, 2),
        }
    }
}

impl PricingConfig {
    /// Check that amounts are non-negative and the tax rate is below 100%.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPricing` describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.free_shipping_threshold < Decimal::ZERO {
            return Err(ConfigError::InvalidPricing(
                "free shipping threshold cannot be negative".to_string(),
            ));
        }
        if self.flat_shipping_fee < Decimal::ZERO {
            return Err(ConfigError::InvalidPricing(
                "shipping fee cannot be negative".to_string(),
            ));
        }
        if self.tax_rate < Decimal::ZERO || self.tax_rate >= Decimal::ONE {
            return Err(ConfigError::InvalidPricing(format!(
                "tax rate must be in [0, 1), got {}",
                self.tax_rate
            )));
        }
        Ok(())
    }

    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let pricing = Self {
            currency: parse_env_or("STOREFRONT_CURRENCY", defaults.currency)?,
            free_shipping_threshold: parse_env_or(
                "STOREFRONT_FREE_SHIPPING_THRESHOLD",
                defaults.free_shipping_threshold,
            )?,
            flat_shipping_fee: parse_env_or(
                "STOREFRONT_FLAT_SHIPPING_FEE",
                defaults.flat_shipping_fee,
            )?,
            tax_rate: parse_env_or("STOREFRONT_TAX_RATE", defaults.tax_rate)?,
        };
        pricing.validate()?;
        Ok(pricing)
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            catalog_path: None,
            cart_store: CartStoreKind::default(),
            data_dir: PathBuf::from(".data"),
            simulated_latency: Duration::ZERO,
            pricing: PricingConfig::default(),
            log_format: LogFormat::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed, or if
    /// the pricing settings are out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let defaults = Self::default();
        let latency_ms: u64 = parse_env_or("STOREFRONT_SIMULATED_LATENCY_MS", 0)?;

        Ok(Self {
            host: parse_env_or("STOREFRONT_HOST", defaults.host)?,
            port: parse_env_or("STOREFRONT_PORT", defaults.port)?,
            catalog_path: get_optional_env("STOREFRONT_CATALOG_PATH").map(PathBuf::from),
            cart_store: parse_env_or("STOREFRONT_CART_STORE", defaults.cart_store)?,
            data_dir: get_optional_env("STOREFRONT_DATA_DIR")
                .map_or(defaults.data_dir, PathBuf::from),
            simulated_latency: Duration::from_millis(latency_ms),
            pricing: PricingConfig::from_env()?,
            log_format: parse_env_or("STOREFRONT_LOG_FORMAT", defaults.log_format)?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| parse_value(key, &raw))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
