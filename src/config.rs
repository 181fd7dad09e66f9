// src/config.rs
use crate::domain::errors::{AppError, AppResult};
use crate::infrastructure::exchange::gateway::{DEFAULT_PRIVATE_URL, DEFAULT_PUBLIC_URL};
use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::File;
use std::path::Path;

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Adapter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Venue endpoints and credentials
    pub exchange: ExchangeConfig,

    /// Symbols the demo binary reports on (e.g., ["ETH/BTC", "LTC/BTC"])
    pub symbols: Vec<String>,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Venue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// API key. Only private calls need it.
    pub api_key: Option<String>,

    /// API secret
    pub api_secret: Option<String>,

    /// Base URL of the public API
    pub public_url: String,

    /// URL of the signed trading API
    pub private_url: String,

    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "warn", "error")
    pub level: String,

    /// Log to file
    pub to_file: bool,

    /// Log file path
    pub file_path: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let timeout_ms = match env::var("LIQUI_TIMEOUT_MS") {
            Ok(value) => value.parse().map_err(|_| {
                AppError::Config(format!("Invalid LIQUI_TIMEOUT_MS value: {}", value))
            })?,
            Err(_) => DEFAULT_TIMEOUT_MS,
        };

        let exchange_config = ExchangeConfig {
            api_key: env::var("LIQUI_API_KEY").ok().filter(|k| !k.is_empty()),
            api_secret: env::var("LIQUI_API_SECRET").ok().filter(|s| !s.is_empty()),
            public_url: env::var("LIQUI_PUBLIC_URL").unwrap_or_else(|_| DEFAULT_PUBLIC_URL.to_string()),
            private_url: env::var("LIQUI_PRIVATE_URL")
                .unwrap_or_else(|_| DEFAULT_PRIVATE_URL.to_string()),
            timeout_ms,
        };

        let symbols = env::var("LIQUI_SYMBOLS")
            .unwrap_or_else(|_| "ETH/BTC".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let logging_config = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            to_file: env::var("LOG_TO_FILE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            file_path: env::var("LOG_FILE_PATH").ok(),
        };

        Ok(Config {
            exchange: exchange_config,
            symbols,
            logging: logging_config,
        })
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {}: {}", path.display(), e))
        })
    }

    /// Save configuration to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> AppResult<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)
            .map_err(|e| AppError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn has_credentials(&self) -> bool {
        self.exchange.api_key.is_some() && self.exchange.api_secret.is_some()
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self) -> AppResult<()> {
        let mut builder = env_logger::Builder::new();

        let log_level = match self.logging.level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        };

        builder.filter_level(log_level);

        if self.logging.to_file {
            if let Some(file_path) = &self.logging.file_path {
                let file = File::create(file_path)
                    .map_err(|e| AppError::Config(format!("Failed to create log file: {}", e)))?;

                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
        }

        builder
            .try_init()
            .map_err(|e| AppError::Config(format!("Failed to initialize logger: {}", e)))?;

        Ok(())
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_secret: None,
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            private_url: DEFAULT_PRIVATE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exchange: ExchangeConfig::default(),
            symbols: vec!["ETH/BTC".to_string()],
            logging: LoggingConfig {
                level: "info".to_string(),
                to_file: false,
                file_path: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_liqui() {
        let config = Config::default();
        assert_eq!(config.exchange.public_url, "https://api.liqui.io/api/3");
        assert_eq!(config.exchange.private_url, "https://api.liqui.io/tapi");
        assert_eq!(config.exchange.timeout_ms, 10_000);
        assert_eq!(config.symbols, vec!["ETH/BTC".to_string()]);
        assert!(!config.has_credentials());
    }

    #[test]
    fn file_round_trip() {
        let path = std::env::temp_dir().join(format!("liqui_adapter_config_{}.json", std::process::id()));
        let mut config = Config::default();
        config.exchange.api_key = Some("key".to_string());
        config.symbols.push("LTC/BTC".to_string());

        config.to_file(&path).unwrap();
        let loaded = Config::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.exchange.api_key.as_deref(), Some("key"));
        assert_eq!(loaded.symbols, config.symbols);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = Config::from_file("/nonexistent/liqui.json").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn malformed_file_names_the_path() {
        let path = std::env::temp_dir().join(format!("liqui_adapter_bad_{}.json", std::process::id()));
        std::fs::write(&path, "{\"symbols\": ").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        match err {
            AppError::Config(message) => assert!(message.contains("liqui_adapter_bad_")),
            other => panic!("unexpected error: {}", other),
        }
    }
}
