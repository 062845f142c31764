use std::env;
use std::fmt;

/// Distinguishes runtime behavior for different stages of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the client.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub api: ApiConfig,
    pub checkout: CheckoutConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let base_url = env::var("API_BASE_URL").map_err(|_| ConfigError::MissingBaseUrl)?;
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }

        let timeout_secs = env::var("API_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidTimeout)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            api: ApiConfig {
                base_url,
                timeout_secs,
            },
            checkout: CheckoutConfig::from_env(),
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Settings for reaching the concierge backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

/// Branding and credentials handed to the external payment gateway.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub key: String,
    pub currency: String,
    pub merchant_name: String,
    pub description: String,
    pub logo_url: String,
    pub theme_color: String,
}

impl CheckoutConfig {
    fn from_env() -> Self {
        Self {
            key: env::var("CHECKOUT_KEY").unwrap_or_else(|_| "rzp_test_ErtLVEWcwYUyfw".to_string()),
            currency: env::var("CHECKOUT_CURRENCY").unwrap_or_else(|_| "INR".to_string()),
            merchant_name: env::var("CHECKOUT_MERCHANT")
                .unwrap_or_else(|_| "DNS CONCIERGE".to_string()),
            description: env::var("CHECKOUT_DESCRIPTION")
                .unwrap_or_else(|_| "Order Purchase".to_string()),
            logo_url: env::var("CHECKOUT_LOGO").unwrap_or_else(|_| {
                "https://dnsconcierge.awd.world/web/logo/logo.png".to_string()
            }),
            theme_color: env::var("CHECKOUT_THEME").unwrap_or_else(|_| "#495477".to_string()),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingBaseUrl,
    InvalidTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingBaseUrl => {
                write!(f, "API_BASE_URL must be set to the concierge API root")
            }
            ConfigError::InvalidTimeout => write!(f, "API_TIMEOUT_SECS must be a valid u64"),
        }
    }
}

impl std::error::Error for ConfigError {}
