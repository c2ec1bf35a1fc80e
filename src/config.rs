//! Configuration loading for the reader engine.
//!
//! All user-tunable settings are centralized here and loaded from
//! `conf/config.toml` if present. Any missing or invalid entries fall back to
//! sensible defaults so the pipeline can still run.

use crate::selection::{AutoThresholds, SelectionMode};
use crate::translate::Endpoint;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Environment variable consulted when the config file carries no API key.
pub const API_KEY_ENV: &str = "GOOGLE_AI_API_KEY";

/// High-level app configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct AppConfig {
    #[serde(default = "default_target_language")]
    pub target_language: String,
    #[serde(default)]
    pub per_word_dictionary: bool,
    #[serde(default)]
    pub selection_mode: SelectionMode,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// When set, requests go through this proxy instead of the direct
    /// endpoint, and no local API key is needed.
    #[serde(default)]
    pub proxy_url: Option<String>,
    #[serde(default = "default_min_selection_chars")]
    pub min_selection_chars: usize,
    #[serde(default = "default_max_selection_chars")]
    pub max_selection_chars: usize,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_auto_verbatim_max_words")]
    pub auto_verbatim_max_words: usize,
    #[serde(default = "default_auto_sentence_max_words")]
    pub auto_sentence_max_words: usize,
    #[serde(default = "default_min_scale")]
    pub min_scale: f32,
    #[serde(default = "default_max_scale")]
    pub max_scale: f32,
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f32,
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            target_language: default_target_language(),
            per_word_dictionary: false,
            selection_mode: SelectionMode::default(),
            api_base_url: default_api_base_url(),
            api_key: None,
            proxy_url: None,
            min_selection_chars: default_min_selection_chars(),
            max_selection_chars: default_max_selection_chars(),
            history_limit: default_history_limit(),
            auto_verbatim_max_words: default_auto_verbatim_max_words(),
            auto_sentence_max_words: default_auto_sentence_max_words(),
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            zoom_step: default_zoom_step(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    pub fn auto_thresholds(&self) -> AutoThresholds {
        AutoThresholds {
            verbatim_max_words: self.auto_verbatim_max_words,
            sentence_max_words: self.auto_sentence_max_words,
        }
    }

    /// Resolve the endpoint: the proxy wins when configured, otherwise the
    /// direct endpoint with the key from the config file or the environment.
    /// A missing key is reported at dispatch time, not here.
    pub fn endpoint(&self) -> Endpoint {
        if let Some(url) = self
            .proxy_url
            .as_ref()
            .filter(|u| !u.trim().is_empty())
        {
            return Endpoint::Proxy { url: url.clone() };
        }
        let api_key = self
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()));
        Endpoint::Direct {
            base_url: self.api_base_url.clone(),
            api_key,
        }
    }
}

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> AppConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded base config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&contents) {
        Ok(cfg) => {
            debug!("Parsed configuration from disk");
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err}");
            AppConfig::default()
        }
    }
}

fn default_target_language() -> String {
    "Spanish".to_string()
}

fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-flash-latest:generateContent"
        .to_string()
}

fn default_min_selection_chars() -> usize {
    3
}

fn default_max_selection_chars() -> usize {
    2000
}

fn default_history_limit() -> usize {
    50
}

fn default_auto_verbatim_max_words() -> usize {
    3
}

fn default_auto_sentence_max_words() -> usize {
    10
}

fn default_min_scale() -> f32 {
    0.5
}

fn default_max_scale() -> f32 {
    3.0
}

fn default_zoom_step() -> f32 {
    0.1
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
