//! Slack Web API client.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::config::SlackConfig;
use crate::error::{Error, Result};
use crate::platform::{Platform, PlatformChannel, PlatformUser};

const PAGE_LIMIT: &str = "200";

/// Every Web API response carries `ok` and, on failure, `error`.
#[derive(Debug, Deserialize)]
struct SlackEnvelope<T> {
    ok: bool,
    error: Option<String>,
    #[serde(flatten)]
    body: T,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

#[derive(Debug, Deserialize)]
struct SlackMember {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    is_bot: bool,
    #[serde(default)]
    is_admin: bool,
    #[serde(default)]
    deleted: bool,
}

#[derive(Debug, Deserialize)]
struct UsersPage {
    #[serde(default)]
    members: Vec<SlackMember>,
    #[serde(default)]
    response_metadata: ResponseMetadata,
}

#[derive(Debug, Deserialize)]
struct SlackConversation {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    is_archived: bool,
}

#[derive(Debug, Deserialize)]
struct ConversationsPage {
    #[serde(default)]
    channels: Vec<SlackConversation>,
    #[serde(default)]
    response_metadata: ResponseMetadata,
}

#[derive(Debug, Deserialize)]
struct OpenConnection {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Empty {}

#[derive(Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
    app_token: Option<String>,
}

impl SlackClient {
    pub fn new(
        api_base: &str,
        bot_token: &str,
        app_token: Option<&str>,
        request_timeout_ms: u64,
    ) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("golem-bot"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token: bot_token.trim().to_string(),
            app_token: app_token.map(|t| t.trim().to_string()),
        })
    }

    pub fn from_config(config: &SlackConfig) -> Result<Self> {
        Self::new(
            &config.api_base,
            config.require_bot_token()?,
            config.app_token.as_deref(),
            config.request_timeout_ms,
        )
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base, method)
    }

    async fn decode<T: DeserializeOwned>(
        method: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Slack(format!("{} failed with status {}", method, status)));
        }
        let envelope: SlackEnvelope<T> = response.json().await?;
        if !envelope.ok {
            return Err(Error::Slack(format!(
                "{} failed: {}",
                method,
                envelope.error.unwrap_or_else(|| "unknown error".to_string())
            )));
        }
        Ok(envelope.body)
    }

    async fn get<T: DeserializeOwned>(&self, method: &str, query: &[(&str, &str)]) -> Result<T> {
        let response = self
            .http
            .get(self.url(method))
            .bearer_auth(&self.bot_token)
            .query(query)
            .send()
            .await?;
        Self::decode(method, response).await
    }

    async fn list_conversations(&self, types: &str) -> Result<Vec<PlatformChannel>> {
        let mut cursor = String::new();
        let mut out = Vec::new();
        loop {
            let mut query = vec![
                ("types", types),
                ("exclude_archived", "true"),
                ("limit", PAGE_LIMIT),
            ];
            if !cursor.is_empty() {
                query.push(("cursor", cursor.as_str()));
            }
            let page: ConversationsPage = self.get("conversations.list", &query).await?;
            out.extend(
                page.channels
                    .into_iter()
                    .filter(|c| !c.is_archived)
                    .map(|c| PlatformChannel { id: c.id, name: c.name }),
            );
            if page.response_metadata.next_cursor.is_empty() {
                return Ok(out);
            }
            cursor = page.response_metadata.next_cursor;
        }
    }

    /// Open a Socket Mode connection and return its websocket URL.
    pub async fn open_socket_connection(&self) -> Result<String> {
        let app_token = self
            .app_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Config("slack.app_token is not configured".to_string()))?;

        let response = self
            .http
            .post(self.url("apps.connections.open"))
            .bearer_auth(app_token)
            .send()
            .await?;
        let opened: OpenConnection = Self::decode("apps.connections.open", response).await?;
        opened
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| Error::Slack("apps.connections.open did not return url".to_string()))
    }
}

#[async_trait]
impl Platform for SlackClient {
    fn name(&self) -> &str {
        "slack"
    }

    async fn list_users(&self) -> Result<Vec<PlatformUser>> {
        let mut cursor = String::new();
        let mut out = Vec::new();
        loop {
            let mut query = vec![("limit", PAGE_LIMIT)];
            if !cursor.is_empty() {
                query.push(("cursor", cursor.as_str()));
            }
            let page: UsersPage = self.get("users.list", &query).await?;
            out.extend(page.members.into_iter().filter(|m| !m.deleted).map(|m| {
                PlatformUser {
                    id: m.id,
                    name: m.name,
                    is_bot: m.is_bot,
                    is_admin: m.is_admin,
                }
            }));
            if page.response_metadata.next_cursor.is_empty() {
                return Ok(out);
            }
            cursor = page.response_metadata.next_cursor;
        }
    }

    async fn list_channels(&self) -> Result<Vec<PlatformChannel>> {
        self.list_conversations("public_channel").await
    }

    async fn list_groups(&self) -> Result<Vec<PlatformChannel>> {
        self.list_conversations("private_channel").await
    }

    async fn post_message(&self, destination: &str, text: &str, as_user: bool) -> Result<()> {
        let payload = json!({
            "channel": destination,
            "text": text,
            "as_user": as_user,
            "unfurl_links": false,
        });
        let response = self
            .http
            .post(self.url("chat.postMessage"))
            .bearer_auth(&self.bot_token)
            .json(&payload)
            .send()
            .await?;
        let _: Empty = Self::decode("chat.postMessage", response).await?;
        Ok(())
    }
}
