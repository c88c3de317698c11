//! Configuration loading for Golem.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Get the Golem home directory (~/.golem).
pub fn get_home_dir() -> Result<PathBuf> {
    let home = directories::UserDirs::new()
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

    Ok(home.home_dir().join(".golem"))
}

/// Get the default settings file path.
pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("settings.json"))
}

/// Load settings from an explicit path, or ~/.golem/settings.json.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => get_settings_path()?,
    };

    if !path.exists() {
        return Err(Error::Config(format!(
            "Settings file not found at {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(&path)?;
    let settings: Settings = serde_json::from_str(&content)?;
    validate_settings(&settings)?;

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

fn validate_settings(settings: &Settings) -> Result<()> {
    if settings.bot.name.trim().is_empty() {
        return Err(Error::Config("bot.name must not be empty".to_string()));
    }

    let mut seen = std::collections::HashSet::new();
    for channel in &settings.bot.channels {
        let key = channel.name.trim().to_lowercase();
        if key.is_empty() {
            return Err(Error::Config("bot.channels entry without a name".to_string()));
        }
        if !seen.insert(key) {
            return Err(Error::Config(format!(
                "bot.channels lists '{}' more than once",
                channel.name
            )));
        }
    }

    if settings.admin.enabled && settings.admin.jwt_secret.trim().is_empty() {
        return Err(Error::Config(
            "admin.jwt_secret is required when the admin API is enabled".to_string(),
        ));
    }
    Ok(())
}

fn require<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Config(format!("{} is not configured", field)))
}

/// Slack configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SlackConfig {
    pub bot_token: Option<String>,
    pub app_token: Option<String>,
    #[serde(default = "default_slack_api_base")]
    pub api_base: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

impl SlackConfig {
    pub fn require_bot_token(&self) -> Result<&str> {
        require(&self.bot_token, "slack.bot_token")
    }

    pub fn require_app_token(&self) -> Result<&str> {
        require(&self.app_token, "slack.app_token")
    }
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            app_token: None,
            api_base: default_slack_api_base(),
            request_timeout_ms: default_request_timeout_ms(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

fn default_slack_api_base() -> String {
    "https://slack.com/api".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_reconnect_delay_ms() -> u64 {
    3_000
}

/// A channel the bot knows about before it connects.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChannelSeed {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub welcome: bool,
    #[serde(default)]
    pub special: bool,
}

fn default_channels() -> Vec<ChannelSeed> {
    vec![
        ChannelSeed {
            name: "random".to_string(),
            description: "For random stuff".to_string(),
            welcome: true,
            special: false,
        },
        ChannelSeed {
            name: "general".to_string(),
            description: "For general discussions".to_string(),
            welcome: true,
            special: false,
        },
    ]
}

/// Bot behaviour configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BotConfig {
    #[serde(default = "default_bot_name")]
    pub name: String,
    /// Internal addressing prefix, e.g. `"golem "`. Empty disables it.
    #[serde(default)]
    pub prefix: String,
    #[serde(default = "default_channels")]
    pub channels: Vec<ChannelSeed>,
    /// Response table loaded at startup.
    #[serde(default)]
    pub responses: HashMap<String, Vec<String>>,
    pub welcome_message: Option<String>,
}

fn default_bot_name() -> String {
    "golem".to_string()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            prefix: String::new(),
            channels: default_channels(),
            responses: HashMap::new(),
            welcome_message: None,
        }
    }
}

/// GitHub configuration for repository commands.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GithubConfig {
    pub token: Option<String>,
    #[serde(default = "default_github_api_base")]
    pub api_base: String,
    /// Create repositories under this organization instead of the token's user.
    pub organization: Option<String>,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl GithubConfig {
    pub fn require_token(&self) -> Result<&str> {
        require(&self.token, "github.token")
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: default_github_api_base(),
            organization: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_github_api_base() -> String {
    "https://api.github.com".to_string()
}

/// Admin API configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AdminConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_admin_host")]
    pub host: String,
    #[serde(default = "default_admin_port")]
    pub port: u16,
    #[serde(default)]
    pub jwt_secret: String,
}

fn default_admin_host() -> String {
    "127.0.0.1".to_string()
}

fn default_admin_port() -> u16 {
    3333
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_admin_host(),
            port: default_admin_port(),
            jwt_secret: String::new(),
        }
    }
}

/// Golem settings.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Settings {
    #[serde(default)]
    pub slack: SlackConfig,

    #[serde(default)]
    pub bot: BotConfig,

    #[serde(default)]
    pub github: GithubConfig,

    #[serde(default)]
    pub admin: AdminConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_settings(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("settings.json");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_empty_settings_use_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(&dir, "{}");

        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.bot.name, "golem");
        assert_eq!(settings.bot.channels.len(), 2);
        assert!(settings.bot.channels.iter().all(|c| c.welcome));
        assert_eq!(settings.slack.api_base, "https://slack.com/api");
        assert!(!settings.admin.enabled);
        assert!(settings.slack.require_bot_token().is_err());
    }

    #[test]
    fn test_full_settings() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(
            &dir,
            r#"{
                "slack": { "bot_token": "xoxb-1", "app_token": "xapp-1" },
                "bot": {
                    "name": "golem",
                    "prefix": "golem ",
                    "channels": [{ "name": "Ops", "special": true }],
                    "responses": { "help": ["try: status", "try: deploy"] }
                },
                "github": { "token": "ghp", "organization": "acme" },
                "admin": { "enabled": true, "jwt_secret": "s3cret", "port": 4000 }
            }"#,
        );

        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.slack.require_bot_token().unwrap(), "xoxb-1");
        assert_eq!(settings.slack.require_app_token().unwrap(), "xapp-1");
        assert_eq!(settings.bot.prefix, "golem ");
        assert_eq!(settings.bot.channels.len(), 1);
        assert!(settings.bot.channels[0].special);
        assert_eq!(settings.bot.responses["help"].len(), 2);
        assert_eq!(settings.github.organization.as_deref(), Some("acme"));
        assert_eq!(settings.admin.port, 4000);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_settings(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_admin_requires_secret() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(&dir, r#"{ "admin": { "enabled": true } }"#);
        assert!(matches!(load_settings(Some(&path)), Err(Error::Config(_))));
    }

    #[test]
    fn test_duplicate_channel_names_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(
            &dir,
            r#"{ "bot": { "channels": [{ "name": "ops" }, { "name": "OPS" }] } }"#,
        );
        assert!(matches!(load_settings(Some(&path)), Err(Error::Config(_))));
    }

    #[test]
    fn test_blank_token_is_missing() {
        let slack = SlackConfig {
            bot_token: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(slack.require_bot_token().is_err());
    }
}
