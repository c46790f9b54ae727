//! flagquiz configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level flagquiz configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlagquizConfig {
    /// Question bank file or directory. `None` uses the built-in bank.
    #[serde(default)]
    pub questions: Option<PathBuf>,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub client: ClientSettings,
}

/// HTTP service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Address to bind.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
    /// Largest accepted request body.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind
            .parse()
            .with_context(|| format!("invalid bind address: {}", self.bind))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            request_timeout_ms: default_request_timeout(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

/// Where a player's submissions are judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorMode {
    /// In-process, against the loaded question bank.
    #[default]
    Local,
    /// Over HTTP against a running `flagquiz serve` at `base_url`.
    Remote,
}

/// Settings for the player-facing side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSettings {
    #[serde(default)]
    pub mode: ValidatorMode,
    /// Base URL of the service, required in remote mode.
    #[serde(default)]
    pub base_url: Option<String>,
    /// How long to wait for a verdict before counting it as incorrect.
    #[serde(default = "default_client_timeout")]
    pub timeout_ms: u64,
    /// Max concurrent validations when grading an answer sheet.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

impl ClientSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            mode: ValidatorMode::Local,
            base_url: None,
            timeout_ms: default_client_timeout(),
            parallelism: default_parallelism(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}
fn default_request_timeout() -> u64 {
    5_000
}
fn default_body_limit() -> usize {
    16 * 1024
}
fn default_client_timeout() -> u64 {
    10_000
}
fn default_parallelism() -> usize {
    4
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `flagquiz.toml` in the current directory
/// 2. `~/.config/flagquiz/config.toml`
///
/// Environment variable overrides: `FLAGQUIZ_QUESTIONS`, `FLAGQUIZ_BIND`,
/// `FLAGQUIZ_SERVER_URL`.
pub fn load_config_from(path: Option<&Path>) -> Result<FlagquizConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("flagquiz.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => FlagquizConfig::default(),
    };

    Ok(apply_env_overrides(config))
}

/// Parse a config document and expand `${VAR}` references.
pub fn parse_config_str(content: &str) -> Result<FlagquizConfig> {
    let mut config: FlagquizConfig = toml::from_str(content)?;

    config.questions = config
        .questions
        .map(|p| PathBuf::from(resolve_env_vars(&p.to_string_lossy())));
    config.server.bind = resolve_env_vars(&config.server.bind);
    config.client.base_url = config.client.base_url.map(|u| resolve_env_vars(&u));

    Ok(config)
}

fn apply_env_overrides(mut config: FlagquizConfig) -> FlagquizConfig {
    if let Ok(path) = std::env::var("FLAGQUIZ_QUESTIONS") {
        config.questions = Some(PathBuf::from(path));
    }
    if let Ok(bind) = std::env::var("FLAGQUIZ_BIND") {
        config.server.bind = bind;
    }
    if let Ok(url) = std::env::var("FLAGQUIZ_SERVER_URL") {
        config.client.mode = ValidatorMode::Remote;
        config.client.base_url = Some(url);
    }
    config
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("flagquiz"))
}
