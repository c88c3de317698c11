//! The chat bot: one-time initialization, then one dispatch per event.

use std::sync::{Arc, RwLock};

use super::channels::ChannelRegistry;
use super::command::{parse_command, StructuredCommand};
use super::identity::{resolve_identity, Identity};
use super::responses::ResponseTable;
use super::routing::{classify, filter_reason, is_addressed, normalize, prepare_text};
use super::routing::{Classified, FilterReason};
use crate::config::BotConfig;
use crate::error::{Error, Result};
use crate::platform::{InboundEvent, Platform, TeamJoin};
use crate::repository::{RepositoryHost, RepositoryRequest};

pub const NOT_UNDERSTOOD_MESSAGE: &str = "Sorry I was not able to understand";
pub const REPOSITORY_CREATED_MESSAGE: &str = "Repository successfully created";
pub const DEPLOYED_MESSAGE: &str = "Bot deployed";

pub fn repository_failed_message(reason: &str) -> String {
    format!("Repository creation failed: {}", reason)
}

pub fn default_welcome_message(user_name: &str) -> String {
    format!("Welcome to the team {}!", user_name)
}

/// What happened to one inbound event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    Filtered(FilterReason),
    Unaddressed,
    /// `sent` replies were delivered, `failed` were logged and dropped.
    Responded { sent: usize, failed: usize },
}

pub struct ChatBot {
    name: String,
    prefix: String,
    platform: Arc<dyn Platform>,
    repositories: Arc<dyn RepositoryHost>,
    channels: ChannelRegistry,
    responses: Arc<ResponseTable>,
    welcome: RwLock<Option<String>>,
    identity: Option<Identity>,
}

impl ChatBot {
    pub fn new(
        config: &BotConfig,
        platform: Arc<dyn Platform>,
        repositories: Arc<dyn RepositoryHost>,
    ) -> Self {
        let responses = ResponseTable::new();
        if !config.responses.is_empty() {
            responses.set_responses(config.responses.clone());
        }

        Self {
            name: config.name.trim().to_string(),
            prefix: config.prefix.clone(),
            platform,
            repositories,
            channels: ChannelRegistry::from_seeds(&config.channels),
            responses: Arc::new(responses),
            welcome: RwLock::new(config.welcome_message.clone()),
            identity: None,
        }
    }

    /// Resolve the bot's identity and channel ids, then tell the admin.
    ///
    /// Runs once; dispatch is refused until it has succeeded.
    pub async fn initialize(&mut self) -> Result<()> {
        if self.identity.is_some() {
            return Err(Error::Initialization("bot is already initialized".to_string()));
        }

        tracing::info!("Determining the bot / user IDs");
        let users = self
            .platform
            .list_users()
            .await
            .map_err(|e| Error::Initialization(format!("failed to list users: {}", e)))?;
        let identity = resolve_identity(&users, &self.name)?;

        tracing::info!("Determining channel IDs");
        let channels = self
            .platform
            .list_channels()
            .await
            .map_err(|e| Error::Initialization(format!("failed to list channels: {}", e)))?;
        for channel in &channels {
            self.channels.resolve_id(&channel.name, &channel.id);
        }

        tracing::info!("Determining group IDs");
        let groups = self
            .platform
            .list_groups()
            .await
            .map_err(|e| Error::Initialization(format!("failed to list groups: {}", e)))?;
        for group in &groups {
            self.channels.resolve_id(&group.name, &group.id);
        }

        let unresolved = self.channels.unresolved();
        if !unresolved.is_empty() {
            tracing::warn!("Channels not found on {}: {:?}", self.platform.name(), unresolved);
        }

        tracing::info!("Initialized {} with ID {}", self.name, identity.bot_id);
        let admin = identity.admin_id.clone();
        self.identity = Some(identity);

        match admin {
            Some(admin_id) => {
                if let Err(e) = self.platform.post_message(&admin_id, DEPLOYED_MESSAGE, true).await {
                    tracing::warn!("Deployment notice to {} failed: {}", admin_id, e);
                }
            }
            None => tracing::warn!("No administrator found, skipping deployment notice"),
        }

        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.identity.is_some()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channels(&self) -> &ChannelRegistry {
        &self.channels
    }

    pub fn responses(&self) -> &Arc<ResponseTable> {
        &self.responses
    }

    /// Replace the welcome text used for future joins.
    pub fn set_welcome_message(&self, text: &str) {
        let mut welcome = self.welcome.write().unwrap_or_else(|p| p.into_inner());
        *welcome = Some(text.to_string()).filter(|t| !t.is_empty());
    }

    pub fn welcome_message(&self) -> Option<String> {
        self.welcome.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn ready_identity(&self) -> Result<&Identity> {
        self.identity.as_ref().ok_or(Error::NotReady)
    }

    /// Dispatch one message event.
    pub async fn handle_message(&self, event: &InboundEvent) -> Result<Dispatch> {
        let identity = self.ready_identity()?;

        if let Some(reason) = filter_reason(event) {
            tracing::trace!("Discarding event in {}: {}", event.channel, reason);
            return Ok(Dispatch::Filtered(reason));
        }

        let text = prepare_text(&event.text);
        if !is_addressed(&event.channel, &text, &self.prefix, &self.name) {
            return Ok(Dispatch::Unaddressed);
        }

        let text = normalize(&text, &self.prefix, &identity.alias);
        tracing::debug!("Message from {} in {}: {:?}", event.user, event.channel, text);

        let replies = match classify(&text) {
            Classified::Structured(fields) => vec![self.handle_structured(&fields).await],
            Classified::Lookup(key) => {
                let replies = self.responses.lookup(key);
                if replies.is_empty() {
                    vec![NOT_UNDERSTOOD_MESSAGE.to_string()]
                } else {
                    replies
                }
            }
        };

        let mut sent = 0;
        let mut failed = 0;
        for reply in &replies {
            if self.respond(&event.channel, reply).await {
                sent += 1;
            } else {
                failed += 1;
            }
        }
        Ok(Dispatch::Responded { sent, failed })
    }

    async fn handle_structured(&self, fields: &[&str]) -> String {
        match parse_command(fields) {
            Ok(StructuredCommand::CreateRepository(request)) => {
                self.create_repository(&request).await
            }
            Err(e) => {
                tracing::info!("Rejected command {:?}: {}", fields.join(" "), e);
                NOT_UNDERSTOOD_MESSAGE.to_string()
            }
        }
    }

    async fn create_repository(&self, request: &RepositoryRequest) -> String {
        match self.repositories.create_repository(request).await {
            Ok(created) => {
                tracing::info!(
                    "Created {} repository {} on {}",
                    request.scope,
                    created.full_name,
                    self.repositories.name()
                );
                REPOSITORY_CREATED_MESSAGE.to_string()
            }
            Err(e) => {
                tracing::error!("Repository {} creation failed: {}", request.name, e);
                let reason = match e {
                    Error::Repository(reason) => reason,
                    other => other.to_string(),
                };
                repository_failed_message(&reason)
            }
        }
    }

    /// Greet a new workspace member by direct message.
    pub async fn team_joined(&self, join: &TeamJoin) -> Result<bool> {
        self.ready_identity()?;

        let message = self
            .welcome_message()
            .unwrap_or_else(|| default_welcome_message(&join.user_name));
        Ok(self.respond(&join.user_id, &message).await)
    }

    /// Send one message; failures are logged and never retried.
    async fn respond(&self, destination: &str, text: &str) -> bool {
        match self.platform.post_message(destination, text, true).await {
            Ok(()) => true,
            Err(e) => {
                let e = Error::Send(format!("{} to {}: {}", self.platform.name(), destination, e));
                tracing::error!("{}", e);
                false
            }
        }
    }
}
