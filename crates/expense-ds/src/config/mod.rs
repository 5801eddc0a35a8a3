use std::env;
use std::fmt;

use crate::extraction::DEFAULT_TRANSACTION_KEYWORDS;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_MODEL_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 30;

/// Distinguishes runtime behavior for different stages of the service.
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

/// Top-level configuration for the extraction service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub model: ModelConfig,
    pub extraction: ExtractionConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let api_key = env::var("GOOGLE_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        let model = env::var("DS_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let endpoint =
            env::var("DS_MODEL_ENDPOINT").unwrap_or_else(|_| DEFAULT_MODEL_ENDPOINT.to_string());
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(ConfigError::InvalidEndpoint(endpoint));
        }
        let timeout_secs = match env::var("DS_MODEL_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout)?,
            Err(_) => DEFAULT_MODEL_TIMEOUT_SECS,
        };

        let keywords = match env::var("DS_TRANSACTION_KEYWORDS") {
            Ok(raw) => parse_keywords(&raw),
            Err(_) => default_keywords(),
        };

        Ok(Self {
            environment,
            model: ModelConfig {
                api_key,
                model,
                endpoint,
                timeout_secs,
            },
            extraction: ExtractionConfig { keywords },
            telemetry: TelemetryConfig::load(),
        })
    }
}

/// Settings for the generative model client.
#[derive(Clone)]
pub struct ModelConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl ModelConfig {
    /// The API key, required only when a live model call is made.
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_MODEL_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_MODEL_TIMEOUT_SECS,
        }
    }
}

// Keeps the API key out of logged configuration.
impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Message pre-filter settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionConfig {
    pub keywords: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl TelemetryConfig {
    /// Reads only the logging settings, for commands that never call the model.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        Self { log_level }
    }
}

fn default_keywords() -> Vec<String> {
    DEFAULT_TRANSACTION_KEYWORDS
        .iter()
        .map(|keyword| keyword.to_string())
        .collect()
}

fn parse_keywords(raw: &str) -> Vec<String> {
    let keywords: Vec<String> = raw
        .split(',')
        .map(|keyword| keyword.trim().to_string())
        .filter(|keyword| !keyword.is_empty())
        .collect();

    if keywords.is_empty() {
        default_keywords()
    } else {
        keywords
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidTimeout,
    InvalidEndpoint(String),
    MissingApiKey,
    HttpClient(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTimeout => {
                write!(f, "DS_MODEL_TIMEOUT_SECS must be a positive integer")
            }
            ConfigError::InvalidEndpoint(value) => {
                write!(f, "DS_MODEL_ENDPOINT must be an http(s) URL, got '{}'", value)
            }
            ConfigError::MissingApiKey => {
                write!(f, "GOOGLE_API_KEY must be set to call the extraction model")
            }
            ConfigError::HttpClient(err) => write!(f, "unable to build HTTP client: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}
