use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub runner: RunnerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory`.
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "dagen_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Directory for log files. The loader fills in `<data dir>/logs` when unset;
    /// without a loaded config the CLI writes under the user cache dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    false
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// Deployment management API profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL; endpoint paths are appended to it.
    #[serde(default)]
    pub endpoint: String,

    /// Bearer token. Empty means no Authorization header.
    #[serde(default)]
    pub token: String,

    /// Identity sent as `uid` with profile listing and submission.
    #[serde(default)]
    pub user_id: String,

    /// Pre-selected project profile; skips the interactive picker.
    #[serde(default)]
    pub project_profile: Option<String>,

    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,

    /// PEM file holding a client certificate and key.
    #[serde(default)]
    pub client_cert: Option<String>,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_verify_tls() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    60_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            token: String::new(),
            user_id: String::new(),
            project_profile: None,
            verify_tls: default_verify_tls(),
            client_cert: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Interpreter used to execute local-debug artifacts.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,

    #[serde(default = "default_line_channel_capacity")]
    pub line_channel_capacity: usize,
}

fn default_interpreter() -> String {
    "python3".to_string()
}

fn default_line_channel_capacity() -> usize {
    1024
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            line_channel_capacity: default_line_channel_capacity(),
        }
    }
}
