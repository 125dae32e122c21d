//! Configuration loading for the Feishu relay.
//!
//! Settings come from an optional JSON file and are then overridden by the
//! environment (`FEISHU_APP_ID`, `FEISHU_APP_SECRET`, `DEEPSEEK_API_KEY`, `PORT`).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Error;
pub type Result<T> = std::result::Result<T, Error>;

pub const ENV_FEISHU_APP_ID: &str = "FEISHU_APP_ID";
pub const ENV_FEISHU_APP_SECRET: &str = "FEISHU_APP_SECRET";
pub const ENV_DEEPSEEK_API_KEY: &str = "DEEPSEEK_API_KEY";
pub const ENV_PORT: &str = "PORT";

/// Get the default settings file path (`<config dir>/feishu-relay/settings.json`).
pub fn get_settings_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("com", "feishu-relay", "feishu-relay")
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    Ok(dirs.config_dir().join("settings.json"))
}

/// Settings plus what happened while loading them.
///
/// Loading runs before logging is initialised, so the source and any rejected
/// overrides are kept here and reported by [`LoadedSettings::log`].
#[derive(Debug)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

impl LoadedSettings {
    pub fn log(&self) {
        match &self.source {
            Some(path) => tracing::debug!("Loaded settings from {}", path.display()),
            None => tracing::debug!("No settings file, using defaults"),
        }
        for warning in &self.warnings {
            tracing::warn!("{}", warning);
        }
    }
}

/// Load settings from `path` (or the default location) and apply environment overrides.
///
/// An explicit path must exist. The default path is optional; when it is
/// missing the built-in defaults are used.
pub fn load_settings(path: Option<&Path>) -> Result<LoadedSettings> {
    let source = match path {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Settings file not found at {}",
                    path.display()
                )));
            }
            Some(path.to_path_buf())
        }
        None => get_settings_path().ok().filter(|p| p.exists()),
    };

    let mut settings = match &source {
        Some(path) => read_settings_file(path)?,
        None => Settings::default(),
    };

    let warnings = settings.apply_env(|key| std::env::var(key).ok());
    validate_settings(&settings)?;

    Ok(LoadedSettings {
        settings,
        source,
        warnings,
    })
}

fn read_settings_file(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn validate_settings(settings: &Settings) -> Result<()> {
    if settings.server.port == 0 {
        return Err(Error::Config("server.port must be non-zero".to_string()));
    }
    if !(0.0..=2.0).contains(&settings.deepseek.temperature) {
        return Err(Error::Config(format!(
            "deepseek.temperature {} is outside 0.0..=2.0",
            settings.deepseek.temperature
        )));
    }
    if settings.deepseek.timeout_secs == 0 {
        return Err(Error::Config("deepseek.timeout_secs must be non-zero".to_string()));
    }
    Ok(())
}

/// Show the first few characters of a secret, enough to tell keys apart in logs.
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "(not set)".to_string();
    }
    let prefix: String = secret.chars().take(4).collect();
    format!("{}...", prefix)
}

/// Feishu application credentials.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FeishuConfig {
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub app_secret: String,
    #[serde(default = "default_feishu_base_url")]
    pub base_url: String,
}

fn default_feishu_base_url() -> String {
    "https://open.feishu.cn/open-apis".to_string()
}

impl Default for FeishuConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_secret: String::new(),
            base_url: default_feishu_base_url(),
        }
    }
}

/// DeepSeek chat-completion configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DeepSeekConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_deepseek_base_url")]
    pub base_url: String,
    #[serde(default = "default_deepseek_model")]
    pub model: String,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_deepseek_base_url() -> String {
    "https://api.deepseek.com/v1".to_string()
}

fn default_deepseek_model() -> String {
    "deepseek-chat".to_string()
}

fn default_system_prompt() -> String {
    "你是一个有帮助的助手，请用中文回答。".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_deepseek_base_url(),
            model: default_deepseek_model(),
            system_prompt: default_system_prompt(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl DeepSeekConfig {
    /// The API key, if one is set and non-empty.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }
}

/// HTTP listener configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct LoggingConfig {
    /// Directory for the daily-rolling log file. Console only when unset.
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub json: bool,
}

/// Relay settings.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Settings {
    #[serde(default)]
    pub feishu: FeishuConfig,

    #[serde(default)]
    pub deepseek: DeepSeekConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Settings {
    /// Apply environment overrides. `lookup` is `std::env::var` in production.
    ///
    /// Returns a warning for each override that was present but unusable.
    pub fn apply_env<F>(&mut self, lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut warnings = Vec::new();
        if let Some(app_id) = lookup(ENV_FEISHU_APP_ID) {
            self.feishu.app_id = app_id;
        }
        if let Some(app_secret) = lookup(ENV_FEISHU_APP_SECRET) {
            self.feishu.app_secret = app_secret;
        }
        if let Some(api_key) = lookup(ENV_DEEPSEEK_API_KEY) {
            self.deepseek.api_key = Some(api_key);
        }
        if let Some(port) = lookup(ENV_PORT) {
            match port.trim().parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(e) => warnings.push(format!("Ignoring invalid {}={:?}: {}", ENV_PORT, port, e)),
            }
        }
        warnings
    }

    /// Human-readable warnings about missing credentials.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.deepseek.api_key().is_none() {
            warnings.push(format!(
                "{} is not set, free-text messages get a sample reply",
                ENV_DEEPSEEK_API_KEY
            ));
        }
        if self.feishu.app_id.is_empty() || self.feishu.app_secret.is_empty() {
            warnings.push(format!(
                "{} / {} incomplete, replies cannot be delivered",
                ENV_FEISHU_APP_ID, ENV_FEISHU_APP_SECRET
            ));
        }
        warnings
    }

    /// A copy safe to print: secrets reduced to a short prefix.
    pub fn masked(&self) -> Settings {
        let mut masked = self.clone();
        masked.feishu.app_secret = mask_secret(&self.feishu.app_secret);
        masked.deepseek.api_key = Some(mask_secret(self.deepseek.api_key().unwrap_or("")));
        masked
    }
}
