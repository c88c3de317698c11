//! Chat platform seam.
//!
//! The dispatcher only talks to the workspace through this trait; the
//! Slack client is the production implementation.

use async_trait::async_trait;

use crate::error::Result;

/// A workspace member as listed by the platform.
#[derive(Clone, Debug, PartialEq)]
pub struct PlatformUser {
    pub id: String,
    pub name: String,
    pub is_bot: bool,
    pub is_admin: bool,
}

/// A public channel or private group as listed by the platform.
#[derive(Clone, Debug, PartialEq)]
pub struct PlatformChannel {
    pub id: String,
    pub name: String,
}

/// A message event from the live feed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InboundEvent {
    pub user: String,
    pub is_bot: bool,
    pub subtype: Option<String>,
    pub channel: String,
    pub text: String,
}

/// A new workspace member.
#[derive(Clone, Debug, PartialEq)]
pub struct TeamJoin {
    pub user_id: String,
    pub user_name: String,
}

#[async_trait]
pub trait Platform: Send + Sync {
    /// Platform name, for logs.
    fn name(&self) -> &str;

    async fn list_users(&self) -> Result<Vec<PlatformUser>>;

    /// Public channels, archived ones excluded.
    async fn list_channels(&self) -> Result<Vec<PlatformChannel>>;

    /// Private groups the bot is a member of, archived ones excluded.
    async fn list_groups(&self) -> Result<Vec<PlatformChannel>>;

    /// Post `text` to a channel, group, or user id.
    async fn post_message(&self, destination: &str, text: &str, as_user: bool) -> Result<()>;
}
