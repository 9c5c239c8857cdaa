use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Provider configuration for the LLM API
    pub provider: ProviderConfig,
    /// Local cache settings
    #[serde(default)]
    pub cache: CacheConfig,
    /// Batch job settings
    #[serde(default)]
    pub batch: BatchConfig,
    /// Live (per-post) classification settings
    #[serde(default)]
    pub classify: ClassifyConfig,
}

/// Configuration for the LLM provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for the API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
    /// Model identifier (e.g., "gpt-4.1", "gpt-4o-mini")
    #[serde(default = "default_model")]
    pub model: String,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl ProviderConfig {
    /// Resolve the API key from config or the OPENAI_API_KEY variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
    }

    pub fn resolve_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com".to_string())
    }
}

/// Local cache settings
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Root directory for cached posts and collections
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            dir: default_cache_dir(),
        }
    }
}

/// Batch job settings
#[derive(Debug, Deserialize, Clone)]
pub struct BatchConfig {
    /// Seconds between job status checks; clamped to 8-30
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Directory where manifests and downloaded result streams are written
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            poll_interval_secs: default_poll_interval(),
            data_dir: default_data_dir(),
        }
    }
}

impl BatchConfig {
    /// Poll interval bounded to the supported 8-30 second window.
    pub fn clamped_poll_interval(&self) -> u64 {
        self.poll_interval_secs.clamp(8, 30)
    }
}

/// Live classification settings
#[derive(Debug, Deserialize, Clone)]
pub struct ClassifyConfig {
    /// Minimum detection confidence before running the extraction pass
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    /// Fixed delay between per-post calls, in milliseconds
    #[serde(default = "default_stagger_ms")]
    pub stagger_ms: u64,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        ClassifyConfig {
            confidence_threshold: default_confidence_threshold(),
            stagger_ms: default_stagger_ms(),
        }
    }
}

// Default value functions
fn default_model() -> String {
    "gpt-4.1".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_timeout() -> u64 {
    60
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

fn default_poll_interval() -> u64 {
    15
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_confidence_threshold() -> f64 {
    0.3
}

fn default_stagger_ms() -> u64 {
    500
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPEGRAM__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPEGRAM__PROVIDER__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            // Optional config file (can be missing)
            .add_source(File::with_name("config").required(false))
            // Use double underscore for nested: RECIPEGRAM__PROVIDER__MODEL
            .add_source(
                Environment::with_prefix("RECIPEGRAM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
