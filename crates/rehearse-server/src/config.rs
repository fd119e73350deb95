//! Server configuration.

use anyhow::{Context, Result};
use rehearse_core::{CompilerConfig, InterviewPolicy, RetryPolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    #[serde(default = "default_llm_max_attempts")]
    pub llm_max_attempts: u32,
    #[serde(default = "default_llm_base_delay_ms")]
    pub llm_base_delay_ms: u64,
    #[serde(default = "default_llm_status_timeout_secs")]
    pub llm_status_timeout_secs: u64,
    #[serde(default = "default_compiler_path")]
    pub compiler_path: PathBuf,
    #[serde(default = "default_compiler_timeout_secs")]
    pub compiler_timeout_secs: u64,
    /// Question and time limits per interview type.
    #[serde(default)]
    pub interview: InterviewPolicy,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_gemini_model() -> String {
    "gemini-pro".to_string()
}

fn default_llm_max_attempts() -> u32 {
    3
}

fn default_llm_base_delay_ms() -> u64 {
    1000
}

fn default_llm_status_timeout_secs() -> u64 {
    5
}

fn default_compiler_path() -> PathBuf {
    PathBuf::from("g++")
}

fn default_compiler_timeout_secs() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            gemini_api_key: None,
            gemini_model: default_gemini_model(),
            llm_max_attempts: default_llm_max_attempts(),
            llm_base_delay_ms: default_llm_base_delay_ms(),
            llm_status_timeout_secs: default_llm_status_timeout_secs(),
            compiler_path: default_compiler_path(),
            compiler_timeout_secs: default_compiler_timeout_secs(),
            interview: InterviewPolicy::default(),
        }
    }
}

impl Config {
    /// Load config from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Load config from config/default.toml, then the user config directory,
    /// or fall back to defaults.
    pub fn load() -> Result<Self> {
        let local = PathBuf::from("config/default.toml");
        if local.exists() {
            return Self::load_from(&local);
        }

        if let Some(user) = Self::user_config_path() {
            if user.exists() {
                return Self::load_from(&user);
            }
        }

        Ok(Config::default())
    }

    /// `<config dir>/rehearse/config.toml`.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("rehearse").join("config.toml"))
    }

    /// Apply `GEMINI_API_KEY` and `GEMINI_MODEL` from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.gemini_api_key = Some(key);
        }
        if let Some(model) = lookup("GEMINI_MODEL").filter(|m| !m.trim().is_empty()) {
            self.gemini_model = model;
        }
    }

    /// The configured API key, if it is non-empty.
    pub fn api_key(&self) -> Option<&str> {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.llm_max_attempts,
            base_delay: Duration::from_millis(self.llm_base_delay_ms),
        }
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_status_timeout_secs)
    }

    pub fn compiler_config(&self) -> CompilerConfig {
        CompilerConfig {
            program: self.compiler_path.clone(),
            timeout: Duration::from_secs(self.compiler_timeout_secs),
        }
    }
}
