use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main configuration for the advisory service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub weather: WeatherConfig,
    pub translation: TranslationConfig,
    pub llm: LlmConfig,
    pub session: SessionConfig,
    pub recommendation: RecommendationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeather API key; empty means the live path is disabled and every
    /// lookup returns the fallback report.
    pub api_key: String,
    pub timeout_seconds: u64,
    pub cache_ttl_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// DeepL API key; empty disables translation (text passes through).
    pub api_key: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// HuggingFace Inference API token; empty yields the canned
    /// unavailable reply.
    pub token: String,
    pub model: String,
    pub max_new_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub timeout_seconds: u64,
    /// Conversation turns folded into the prompt.
    pub max_history_turns: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// History entries kept per session (a round trip adds two).
    pub max_history_entries: usize,
    pub max_input_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    /// Annual rainfall assumed when the session gives no better figure.
    pub default_rainfall_mm: f64,
}

impl Config {
    /// Load configuration from an optional YAML file with environment
    /// variable overrides. Always returns a usable config; problems are
    /// logged, not fatal.
    pub fn load() -> Self {
        let env_paths = [".env", "../.env"];
        let mut env_loaded = false;
        for path in &env_paths {
            if dotenvy::from_path(path).is_ok() {
                tracing::info!("Loaded .env from: {}", path);
                env_loaded = true;
                break;
            }
        }
        if !env_loaded {
            tracing::debug!("No .env file found - continuing with process env only");
        }

        let config_path =
            env::var("ADVISOR_CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        let mut config = if Path::new(&config_path).exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => match serde_yaml::from_str::<Config>(&contents) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from {}", config_path);
                        config
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to parse config file {}: {} - using defaults",
                            config_path,
                            e
                        );
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::error!(
                        "Failed to read config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        config.apply_env_overrides();

        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(bind) = env::var("ADVISOR_HTTP_BIND") {
            self.server.bind = bind;
        }

        if let Ok(key) = env::var("OPENWEATHER_API_KEY") {
            self.weather.api_key = key;
        }
        if let Ok(key) = env::var("DEEPL_API_KEY") {
            self.translation.api_key = key;
        }
        if let Ok(token) = env::var("HUGGINGFACE_TOKEN") {
            self.llm.token = token;
        }
        if let Ok(model) = env::var("ADVISOR_LLM_MODEL") {
            self.llm.model = model;
        }

        if let Ok(ttl) = env::var("ADVISOR_WEATHER_CACHE_TTL_SECONDS") {
            if let Ok(seconds) = ttl.parse() {
                self.weather.cache_ttl_seconds = seconds;
            }
        }
        if let Ok(max) = env::var("ADVISOR_MAX_HISTORY_ENTRIES") {
            if let Ok(entries) = max.parse() {
                self.session.max_history_entries = entries;
            }
        }
    }

    /// Sanity checks. Missing credentials are warnings, not errors: the
    /// service runs degraded without them.
    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.weather.api_key.is_empty() {
            return Err("OPENWEATHER_API_KEY not set - weather lookups will use fallbacks".into());
        }
        if self.translation.api_key.is_empty() {
            return Err("DEEPL_API_KEY not set - translation disabled".into());
        }
        if self.llm.token.is_empty() {
            return Err("HUGGINGFACE_TOKEN not set - responses will be unavailable".into());
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err("llm.temperature must be between 0.0 and 2.0".into());
        }
        if !(0.0..=1.0).contains(&self.llm.top_p) {
            return Err("llm.top_p must be between 0.0 and 1.0".into());
        }
        if self.session.max_history_entries == 0 {
            return Err("session.max_history_entries cannot be 0".into());
        }
        Ok(())
    }

    fn optional(value: &str) -> Option<String> {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    pub fn weather_api_key(&self) -> Option<String> {
        Self::optional(&self.weather.api_key)
    }

    pub fn translation_api_key(&self) -> Option<String> {
        Self::optional(&self.translation.api_key)
    }

    pub fn llm_token(&self) -> Option<String> {
        Self::optional(&self.llm.token)
    }

    pub fn weather_timeout(&self) -> Duration {
        Duration::from_secs(self.weather.timeout_seconds)
    }

    pub fn weather_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.weather.cache_ttl_seconds)
    }

    pub fn translation_timeout(&self) -> Duration {
        Duration::from_secs(self.translation.timeout_seconds)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "agri-copilot".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                bind: "127.0.0.1:8787".to_string(),
            },
            weather: WeatherConfig {
                api_key: String::new(),
                timeout_seconds: 5,
                cache_ttl_seconds: 3600,
            },
            translation: TranslationConfig {
                api_key: String::new(),
                timeout_seconds: 5,
            },
            llm: LlmConfig {
                token: String::new(),
                model: "mistralai/Mistral-7B-Instruct-v0.2".to_string(),
                max_new_tokens: 300,
                temperature: 0.7,
                top_p: 0.95,
                timeout_seconds: 5,
                max_history_turns: 6,
            },
            session: SessionConfig {
                max_history_entries: 20,
                max_input_chars: 500,
            },
            recommendation: RecommendationConfig {
                default_rainfall_mm: 700.0,
            },
        }
    }
}
