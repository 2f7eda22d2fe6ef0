use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SANDBOX_URL: &str = "http://localhost:8060";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_EDIT_TIMEOUT_SECS: u64 = 30; // window for editing the original message
pub const DEFAULT_REACTION_TIMEOUT_SECS: u64 = 10; // window for confirming a re-run
pub const DEFAULT_GITHUB_URL: &str = "https://github.com/JMcB17/snakeboxed";

/// Top-level config (evalbot.toml + EVALBOT_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvalbotConfig {
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub sandbox: SandboxConfig,
    #[serde(default)]
    pub eval: EvalConfig,
    #[serde(default)]
    pub info: InfoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token. Empty means the Discord adapter refuses to start.
    #[serde(default)]
    pub bot_token: String,
    /// Text prefixes that introduce a command, checked in order.
    #[serde(default = "default_prefixes")]
    pub command_prefixes: Vec<String>,
    /// When true, `@bot eval ...` works in addition to the text prefixes.
    #[serde(default = "bool_true")]
    pub mention_prefix: bool,
    /// Presence status: online, idle, dnd, invisible.
    #[serde(default = "default_status")]
    pub status: String,
    pub activity_name: Option<String>,
    /// playing, listening, watching, competing, custom.
    pub activity_type: Option<String>,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            command_prefixes: default_prefixes(),
            mention_prefix: true,
            status: default_status(),
            activity_name: None,
            activity_type: None,
        }
    }
}

/// Where the snekbox execution service lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Base URL; `/eval` is appended for evaluation requests.
    #[serde(default = "default_sandbox_url")]
    pub url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            url: default_sandbox_url(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Re-evaluation timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    #[serde(default = "default_edit_timeout")]
    pub edit_timeout_secs: u64,
    #[serde(default = "default_reaction_timeout")]
    pub reaction_timeout_secs: u64,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            edit_timeout_secs: DEFAULT_EDIT_TIMEOUT_SECS,
            reaction_timeout_secs: DEFAULT_REACTION_TIMEOUT_SECS,
        }
    }
}

/// Static text served by the informational commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoConfig {
    #[serde(default = "default_github_url")]
    pub github_url: String,
    /// Discord handle of the maintainer, shown by `bugs`.
    pub bug_contact: Option<String>,
}

impl Default for InfoConfig {
    fn default() -> Self {
        Self {
            github_url: default_github_url(),
            bug_contact: None,
        }
    }
}

fn bool_true() -> bool {
    true
}
fn default_prefixes() -> Vec<String> {
    vec!["!".to_string(), "?".to_string()]
}
fn default_status() -> String {
    "online".to_string()
}
fn default_sandbox_url() -> String {
    DEFAULT_SANDBOX_URL.to_string()
}
fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
fn default_edit_timeout() -> u64 {
    DEFAULT_EDIT_TIMEOUT_SECS
}
fn default_reaction_timeout() -> u64 {
    DEFAULT_REACTION_TIMEOUT_SECS
}
fn default_github_url() -> String {
    DEFAULT_GITHUB_URL.to_string()
}

impl EvalbotConfig {
    /// Load config from a TOML file with EVALBOT_* env var overrides.
    ///
    /// Nested keys use a double underscore, e.g. `EVALBOT_DISCORD__BOT_TOKEN`.
    /// Falls back to `~/.evalbot/evalbot.toml` when no path is given.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);
        tracing::debug!(path = %path, "loading config");

        Self::figment(&path)
            .extract()
            .map_err(|e| crate::error::EvalbotError::Config(e.to_string()))
    }

    fn figment(path: &str) -> Figment {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("EVALBOT_").split("__"))
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.evalbot/evalbot.toml", home)
}
