//! CLI commands for Golem using clap.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{load_settings, Settings};
use crate::core::command::parse_command;
use crate::core::identity::mention_for;
use crate::core::routing::{classify, filter_reason, is_addressed, normalize, prepare_text};
use crate::core::routing::Classified;
use crate::core::ChatBot;
use crate::platform::InboundEvent;
use crate::repository::{GithubClient, RepositoryHost, UnconfiguredHost};
use crate::slack::{run_event_feed, SlackClient};
use crate::web::{self, auth, AdminState, WebServerConfig};

/// Golem - Slack workspace bot.
#[derive(Parser)]
#[command(name = "golem")]
#[command(version)]
#[command(about = "Golem - canned replies and repository commands for Slack", long_about = None)]
pub struct Commands {
    /// Settings file (defaults to ~/.golem/settings.json)
    #[arg(long, global = true, env = "GOLEM_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Connect to Slack and answer messages
    Start {
        /// Do not start the admin API even if enabled in settings
        #[arg(long)]
        no_admin: bool,
    },

    /// Validate settings and print a summary
    Check,

    /// Mint a bearer token for the admin API
    Token {
        /// Operator name recorded in the token
        #[arg(long, default_value = "admin")]
        subject: String,

        /// Token lifetime in hours
        #[arg(long, default_value_t = auth::DEFAULT_TOKEN_TTL_HOURS)]
        ttl_hours: i64,
    },

    /// Show how a message would be routed, without connecting
    Route {
        /// Message text
        text: String,

        /// Channel id the message arrives in
        #[arg(long, default_value = "C0000000")]
        channel: String,

        /// Addressing prefix (overrides settings)
        #[arg(long)]
        prefix: Option<String>,

        /// Bot name (overrides settings)
        #[arg(long)]
        name: Option<String>,

        /// Bot platform id used for mention stripping
        #[arg(long, default_value = "B0000000")]
        bot_id: String,
    },
}

impl Commands {
    /// Whether this invocation runs the long-lived bot.
    pub fn is_daemon(&self) -> bool {
        matches!(self.command, Command::Start { .. })
    }

    pub async fn run(self) -> Result<()> {
        let config = self.config.as_deref();
        match self.command {
            Command::Start { no_admin } => start(load_settings(config)?, no_admin).await,
            Command::Check => check(&load_settings(config)?),
            Command::Token { subject, ttl_hours } => {
                let settings = load_settings(config)?;
                let token = auth::generate_token(&settings.admin.jwt_secret, &subject, ttl_hours)
                    .map_err(|e| anyhow::anyhow!("Failed to mint admin token: {}", e))?;
                println!("{}", token);
                Ok(())
            }
            Command::Route {
                text,
                channel,
                prefix,
                name,
                bot_id,
            } => {
                let settings = load_settings(config).unwrap_or_else(|e| {
                    tracing::warn!("{}, using defaults", e);
                    Settings::default()
                });
                let prefix = prefix.unwrap_or_else(|| settings.bot.prefix.clone());
                let name = name.unwrap_or_else(|| settings.bot.name.clone());
                for line in explain_route(&text, &channel, &prefix, &name, &bot_id, &settings) {
                    println!("{}", line);
                }
                Ok(())
            }
        }
    }
}

async fn start(settings: Settings, no_admin: bool) -> Result<()> {
    settings.slack.require_app_token()?;
    let slack = SlackClient::from_config(&settings.slack)?;

    let repositories: Arc<dyn RepositoryHost> = if settings.github.require_token().is_ok() {
        Arc::new(GithubClient::from_config(&settings.github)?)
    } else {
        tracing::warn!("github.token not set, repository commands will fail");
        Arc::new(UnconfiguredHost)
    };

    let mut bot = ChatBot::new(&settings.bot, Arc::new(slack.clone()), repositories);
    bot.initialize().await.context("Failed to initialize bot")?;
    let bot = Arc::new(bot);

    if settings.admin.enabled && !no_admin {
        let state = AdminState::new(bot.clone(), &settings.admin.jwt_secret);
        let server_config = WebServerConfig {
            host: settings.admin.host.clone(),
            port: settings.admin.port,
        };
        tokio::spawn(async move {
            if let Err(e) = web::run_server(server_config, state).await {
                tracing::error!("Admin server stopped: {}", e);
            }
        });
    }

    run_event_feed(
        &slack,
        bot,
        Duration::from_millis(settings.slack.reconnect_delay_ms),
    )
    .await?;
    Ok(())
}

fn check(settings: &Settings) -> Result<()> {
    let status = |ok: bool| if ok { "set" } else { "missing" };

    println!("Bot name:        {}", settings.bot.name);
    println!(
        "Prefix:          {}",
        if settings.bot.prefix.is_empty() {
            "(none)".to_string()
        } else {
            format!("{:?}", settings.bot.prefix)
        }
    );
    println!(
        "Channels:        {}",
        settings
            .bot
            .channels
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Response keys:   {}", settings.bot.responses.len());
    println!(
        "Slack bot token: {}",
        status(settings.slack.require_bot_token().is_ok())
    );
    println!(
        "Slack app token: {}",
        status(settings.slack.require_app_token().is_ok())
    );
    println!(
        "GitHub token:    {}",
        status(settings.github.require_token().is_ok())
    );
    println!(
        "Admin API:       {}",
        if settings.admin.enabled {
            format!("{}:{}", settings.admin.host, settings.admin.port)
        } else {
            "disabled".to_string()
        }
    );
    Ok(())
}

/// Describe each routing step for `text`, offline.
fn explain_route(
    text: &str,
    channel: &str,
    prefix: &str,
    name: &str,
    bot_id: &str,
    settings: &Settings,
) -> Vec<String> {
    let mut out = Vec::new();
    let event = InboundEvent {
        user: "U0000000".to_string(),
        is_bot: false,
        subtype: None,
        channel: channel.to_string(),
        text: text.to_string(),
    };

    if let Some(reason) = filter_reason(&event) {
        out.push(format!("filtered: {}", reason));
        return out;
    }

    let prepared = prepare_text(text);
    if !is_addressed(channel, &prepared, prefix, name) {
        out.push("not addressed: no reply".to_string());
        return out;
    }

    let normalized = normalize(&prepared, prefix, &mention_for(bot_id));
    out.push(format!("normalized: {:?}", normalized));

    match classify(&normalized) {
        Classified::Structured(fields) => match parse_command(&fields) {
            Ok(command) => out.push(format!("structured: {:?}", command)),
            Err(e) => out.push(format!("structured, rejected: {}", e)),
        },
        Classified::Lookup(key) => match settings.bot.responses.get(key) {
            Some(replies) if !replies.is_empty() => {
                out.push(format!("lookup {:?}: {} replies", key, replies.len()))
            }
            _ => out.push(format!("lookup {:?}: not understood", key)),
        },
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        let mut settings = Settings::default();
        settings
            .bot
            .responses
            .insert("help".to_string(), vec!["a".to_string(), "b".to_string()]);
        settings
    }

    #[test]
    fn test_cli_parses() {
        let cli = Commands::try_parse_from(["golem", "--config", "/tmp/s.json", "start", "--no-admin"])
            .unwrap();
        assert!(cli.is_daemon());
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/s.json")));

        let cli = Commands::try_parse_from(["golem", "route", "golem help", "--channel", "D1"])
            .unwrap();
        assert!(!cli.is_daemon());
    }

    #[test]
    fn test_explain_route() {
        let s = settings();
        let lines = explain_route("golem help", "C1", "golem ", "golem", "B1", &s);
        assert_eq!(lines.last().unwrap(), "lookup \"help\": 2 replies");

        let lines = explain_route("help", "C1", "golem ", "golem", "B1", &s);
        assert_eq!(lines, vec!["not addressed: no reply"]);

        let lines = explain_route(
            "create a public git repository demo",
            "D1",
            "",
            "golem",
            "B1",
            &s,
        );
        assert!(lines.last().unwrap().starts_with("structured: CreateRepository"));

        let lines = explain_route("create a public git demo", "D1", "", "golem", "B1", &s);
        assert!(lines.last().unwrap().starts_with("structured, rejected"));
    }
}
