use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

pub const DEFAULT_HF_API_URL: &str = "https://api-inference.huggingface.co/models";

/// Which inference strategy serves the prediction endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Keyword lexicon and image metadata rules. No network, no models.
    Heuristic,
    /// Hosted pretrained models over the Hugging Face inference API.
    Remote,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Heuristic => "heuristic",
            BackendKind::Remote => "remote",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heuristic" | "lightweight" => Ok(BackendKind::Heuristic),
            "remote" | "hf" => Ok(BackendKind::Remote),
            other => Err(ConfigError::Invalid(format!(
                "Unknown backend '{}', expected 'heuristic' or 'remote'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub backend: BackendKind,
    /// Number of prediction records returned per batch response.
    pub preview_limit: usize,
    /// Characters of each row sent to the remote model API.
    pub max_input_chars: usize,
    pub max_upload_bytes: usize,
    pub hf_api_url: String,
    pub hf_api_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            backend: BackendKind::Heuristic,
            preview_limit: 10,
            max_input_chars: crate::remote::DEFAULT_MAX_INPUT_CHARS,
            max_upload_bytes: 10 * 1024 * 1024,
            hf_api_url: DEFAULT_HF_API_URL.to_string(),
            hf_api_token: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with fallback to defaults.
    ///
    /// Numeric variables that fail to parse keep their default. An unknown
    /// backend name is an error.
    pub fn from_env_or_default() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("ML_API_HOST") {
            config.host = host;
        }

        if let Some(port) = lookup("ML_API_PORT").and_then(|v| v.parse().ok()) {
            config.port = port;
        }

        if let Some(backend) = lookup("ML_API_BACKEND") {
            config.backend = backend.parse()?;
        }

        if let Some(limit) = lookup("ML_API_PREVIEW_LIMIT").and_then(|v| v.parse().ok()) {
            config.preview_limit = limit;
        }

        if let Some(chars) = lookup("ML_API_MAX_INPUT_CHARS").and_then(|v| v.parse().ok()) {
            config.max_input_chars = chars;
        }

        if let Some(bytes) = lookup("ML_API_MAX_UPLOAD_BYTES").and_then(|v| v.parse().ok()) {
            config.max_upload_bytes = bytes;
        }

        if let Some(url) = lookup("HF_API_URL") {
            config.hf_api_url = url.trim_end_matches('/').to_string();
        }

        config.hf_api_token = lookup("HF_API_TOKEN").filter(|t| !t.trim().is_empty());

        Ok(config)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::Invalid("Host cannot be empty".to_string()));
        }

        if self.port == 0 {
            return Err(ConfigError::Invalid("Port cannot be zero".to_string()));
        }

        if self.preview_limit == 0 {
            return Err(ConfigError::Invalid(
                "Preview limit must be greater than zero".to_string(),
            ));
        }

        if self.max_input_chars == 0 {
            return Err(ConfigError::Invalid(
                "Max input chars must be greater than zero".to_string(),
            ));
        }

        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "Max upload bytes must be greater than zero".to_string(),
            ));
        }

        if self.backend == BackendKind::Remote {
            if self.hf_api_token.is_none() {
                return Err(ConfigError::Invalid(
                    "HF_API_TOKEN must be set for the remote backend".to_string(),
                ));
            }
            if self.hf_api_url.is_empty() {
                return Err(ConfigError::Invalid("HF_API_URL cannot be empty".to_string()));
            }
        }

        Ok(())
    }
}
