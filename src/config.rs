use std::env;
use std::fmt;
use std::time::Duration;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const DEFAULT_DATABASE: &str = "trip_planner";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 60;
const DEFAULT_DEBOUNCE_MS: u64 = 400;

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => {
                write!(f, "{} has an invalid value: {}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo { uri: String, database: String },
    Memory,
}

/// What the suggestion source does when the generation key is missing or the
/// remote call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionFallback {
    /// Serve matches from the built-in destination table.
    Static,
    /// Disable autocomplete without a key and surface remote errors.
    Strict,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_GENERATION_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
    pub jwt_secret: String,
    pub gemini: GeminiConfig,
    pub suggestion_fallback: SuggestionFallback,
    pub suggestion_debounce: Duration,
}

impl AppConfig {
    /// Reads the configuration from the process environment. Missing store
    /// credentials or JWT secret are fatal; a missing Gemini key is not.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| HOST.to_string());
        let port = match env::var("PORT") {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value })?,
            Err(_) => PORT,
        };

        let store = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "mongo".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => StoreBackend::Memory,
            "mongo" => StoreBackend::Mongo {
                uri: non_empty_var("MONGODB_URI").ok_or(ConfigError::Missing("MONGODB_URI"))?,
                database: env::var("MONGODB_DATABASE")
                    .unwrap_or_else(|_| DEFAULT_DATABASE.to_string()),
            },
            other => {
                return Err(ConfigError::Invalid {
                    key: "STORE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let jwt_secret = non_empty_var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let timeout_secs = match env::var("GENERATION_TIMEOUT_SECS") {
            Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "GENERATION_TIMEOUT_SECS",
                value,
            })?,
            Err(_) => DEFAULT_GENERATION_TIMEOUT_SECS,
        };

        let gemini = GeminiConfig {
            api_key: non_empty_var("GEMINI_API_KEY"),
            model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            api_base: env::var("GEMINI_API_BASE")
                .unwrap_or_else(|_| DEFAULT_GEMINI_API_BASE.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        };

        let suggestion_fallback = match env::var("SUGGESTION_FALLBACK")
            .unwrap_or_else(|_| "static".to_string())
            .to_lowercase()
            .as_str()
        {
            "static" => SuggestionFallback::Static,
            "strict" => SuggestionFallback::Strict,
            other => {
                return Err(ConfigError::Invalid {
                    key: "SUGGESTION_FALLBACK",
                    value: other.to_string(),
                })
            }
        };

        let debounce_ms = match env::var("SUGGESTION_DEBOUNCE_MS") {
            Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "SUGGESTION_DEBOUNCE_MS",
                value,
            })?,
            Err(_) => DEFAULT_DEBOUNCE_MS,
        };

        Ok(Self {
            host,
            port,
            store,
            jwt_secret,
            gemini,
            suggestion_fallback,
            suggestion_debounce: Duration::from_millis(debounce_ms),
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
