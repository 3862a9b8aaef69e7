//! Configuration for the sovereign agent.
//!
//! Loads settings from `$SOVEREIGN_CONFIG`, `./sovereign.toml` or
//! `/etc/sovereign/config.toml`, falling back to defaults.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "SOVEREIGN_CONFIG";

/// Config file in the working directory
pub const LOCAL_CONFIG_PATH: &str = "sovereign.toml";

/// System-wide config file
pub const SYSTEM_CONFIG_PATH: &str = "/etc/sovereign/config.toml";

/// HTTP daemon settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the demo page is served on
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    // Localhost only
    "127.0.0.1:8501".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Local model backend (Ollama-compatible)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Whether runs use the model unless the caller says otherwise
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: 0.0,
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionConfig {
    /// JSON mission context; a missing file means built-in defaults
    #[serde(default = "default_context_path")]
    pub context_path: PathBuf,
}

fn default_context_path() -> PathBuf {
    PathBuf::from("context.json")
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            context_path: default_context_path(),
        }
    }
}

/// Stage reveal pacing and page defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationConfig {
    #[serde(default = "default_incident")]
    pub default_incident: String,

    #[serde(default = "default_delay")]
    pub delay_secs: f64,

    #[serde(default = "default_min_delay")]
    pub min_delay_secs: f64,

    #[serde(default = "default_max_delay")]
    pub max_delay_secs: f64,

    #[serde(default = "default_delay_step")]
    pub delay_step_secs: f64,
}

fn default_incident() -> String {
    "CEO Flight AF276 to Tokyo cancelled due to weather at 23:00".to_string()
}

fn default_delay() -> f64 {
    1.5
}

fn default_min_delay() -> f64 {
    0.5
}

fn default_max_delay() -> f64 {
    3.0
}

fn default_delay_step() -> f64 {
    0.5
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            default_incident: default_incident(),
            delay_secs: default_delay(),
            min_delay_secs: default_min_delay(),
            max_delay_secs: default_max_delay(),
            delay_step_secs: default_delay_step(),
        }
    }
}

impl PresentationConfig {
    /// Finite, non-negative and ordered
    pub fn has_valid_delay_range(&self) -> bool {
        self.min_delay_secs.is_finite()
            && self.max_delay_secs.is_finite()
            && self.min_delay_secs >= 0.0
            && self.min_delay_secs <= self.max_delay_secs
    }

    /// Reject bounds that would make the slider or the delay unusable
    pub fn validate(&self) -> Result<()> {
        if !self.has_valid_delay_range() {
            bail!(
                "invalid delay range {}..{} (bounds must be finite, non-negative and ordered)",
                self.min_delay_secs,
                self.max_delay_secs
            );
        }
        if !self.delay_secs.is_finite() || self.delay_secs < 0.0 {
            bail!("invalid default delay {}", self.delay_secs);
        }
        if !self.delay_step_secs.is_finite() || self.delay_step_secs <= 0.0 {
            bail!("invalid delay step {}", self.delay_step_secs);
        }
        Ok(())
    }

    /// Clamp a requested delay into the slider range. Always returns a
    /// finite, non-negative number of seconds.
    pub fn clamp_delay(&self, requested: f64) -> f64 {
        let fallback = if self.delay_secs.is_finite() && self.delay_secs >= 0.0 {
            self.delay_secs
        } else {
            default_delay()
        };
        if !self.has_valid_delay_range() {
            return fallback;
        }
        if requested.is_nan() {
            return fallback.clamp(self.min_delay_secs, self.max_delay_secs);
        }
        requested.clamp(self.min_delay_secs, self.max_delay_secs)
    }
}

/// Full configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub mission: MissionConfig,

    #[serde(default)]
    pub presentation: PresentationConfig,
}

impl Config {
    /// Load config from the first readable location, or return defaults
    pub fn load() -> Self {
        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            candidates.push(PathBuf::from(path));
        }
        candidates.push(PathBuf::from(LOCAL_CONFIG_PATH));
        candidates.push(PathBuf::from(SYSTEM_CONFIG_PATH));

        for path in &candidates {
            if !path.exists() {
                continue;
            }
            match Self::load_from_path(path) {
                Ok(config) => return config,
                Err(e) => warn!("Ignoring config {}: {}", path.display(), e),
            }
        }

        warn!("No config file found, using defaults");
        Config::default()
    }

    /// Load config from specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.presentation.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
