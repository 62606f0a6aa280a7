use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::color::MAX_CONTRAST_RATIO;
use crate::error::{Result, ShadowError};
use crate::guide::GuideTiming;
use crate::remediation::ContrastThresholds;

pub const DEFAULT_COMPLETION_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_COMPLETION_MODEL: &str = "llama-3.1-8b-instant";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub contrast: ContrastThresholds,
    pub guide: GuideTiming,
    pub completion: CompletionConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Falls back to `SHADOWLIGHT_API_KEY`, then `GROQ_API_KEY`.
    pub api_key: Option<String>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_COMPLETION_ENDPOINT.to_string(),
            model: DEFAULT_COMPLETION_MODEL.to_string(),
            temperature: 0.5,
            max_tokens: 1024,
            timeout: Duration::from_secs(30),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: Option<PathBuf>,
}

impl Config {
    /// Loads config with priority: explicit path > central config > defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => match Self::central_config_path() {
                Some(central) if central.is_file() => Self::from_file(&central),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// `~/.config/shadowlight/config.toml`
    pub fn central_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("shadowlight").join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        let ratios = [
            ("contrast.normal_text", self.contrast.normal_text),
            ("contrast.large_text", self.contrast.large_text),
            ("contrast.ui_component", self.contrast.ui_component),
        ];
        for (name, value) in ratios {
            if !value.is_finite() || !(1.0..=MAX_CONTRAST_RATIO).contains(&value) {
                return Err(ShadowError::Config(format!(
                    "{name} must be between 1.0 and {MAX_CONTRAST_RATIO}, got {value}"
                )));
            }
        }
        self.guide.validate()?;
        if !(0.0..=2.0).contains(&self.completion.temperature) {
            return Err(ShadowError::Config(format!(
                "completion.temperature must be between 0 and 2, got {}",
                self.completion.temperature
            )));
        }
        if self.completion.max_tokens == 0 {
            return Err(ShadowError::Config(
                "completion.max_tokens must be greater than zero".to_string(),
            ));
        }
        url::Url::parse(&self.completion.endpoint)?;
        Ok(())
    }
}
