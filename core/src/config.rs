use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "storydeck.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub api_base: String,
    pub text_model: String,
    pub image_model: String,
    pub image_timeout_secs: u64,
    /// Number of image requests in flight at once. 1 fetches slides one by one.
    pub image_concurrency: usize,
    /// Appended to every visual prompt, e.g. "cartoon style, no background".
    pub image_style: Option<String>,
    pub log_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: storydeck_gemini::DEFAULT_API_BASE.to_string(),
            text_model: "gemini-1.5-flash".to_string(),
            image_model: "gemini-2.0-flash-exp-image-generation".to_string(),
            image_timeout_secs: 60,
            image_concurrency: 4,
            image_style: None,
            log_path: None,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, then the config file (explicit path, or `storydeck.toml` in
    /// the working directory when present), then `.env`, then the environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::load_from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load_from_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };

        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        config.apply_vars(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay settings from a variable lookup (normally the process environment).
    pub fn apply_vars<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("GEMINI_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(base) = get("STORYDECK_API_BASE") {
            self.api_base = base;
        }
        if let Some(model) = get("STORYDECK_TEXT_MODEL") {
            self.text_model = model;
        }
        if let Some(model) = get("STORYDECK_IMAGE_MODEL") {
            self.image_model = model;
        }
        if let Some(style) = get("STORYDECK_IMAGE_STYLE") {
            self.image_style = Some(style);
        }
        if let Some(path) = get("STORYDECK_LOG_PATH") {
            self.log_path = Some(PathBuf::from(path));
        }
        if let Some(secs) = get("STORYDECK_IMAGE_TIMEOUT_SECS") {
            self.image_timeout_secs = parse_number("STORYDECK_IMAGE_TIMEOUT_SECS", &secs)?;
        }
        if let Some(n) = get("STORYDECK_IMAGE_CONCURRENCY") {
            self.image_concurrency = parse_number("STORYDECK_IMAGE_CONCURRENCY", &n)?;
        }
        self.validate()
    }

    /// Reject settings that would make every image fetch fail or stall.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image_timeout_secs == 0 {
            return Err(invalid("image_timeout_secs", self.image_timeout_secs));
        }
        if self.image_concurrency == 0 {
            return Err(invalid("image_concurrency", self.image_concurrency));
        }
        Ok(())
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_path
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("storydeck.log"))
    }
}

fn invalid(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
