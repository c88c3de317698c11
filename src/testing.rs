//! In-memory fakes of the platform and repository host for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::platform::{Platform, PlatformChannel, PlatformUser};
use crate::repository::{CreatedRepository, RepositoryHost, RepositoryRequest};

pub fn user(id: &str, name: &str, is_bot: bool, is_admin: bool) -> PlatformUser {
    PlatformUser {
        id: id.to_string(),
        name: name.to_string(),
        is_bot,
        is_admin,
    }
}

pub fn channel(id: &str, name: &str) -> PlatformChannel {
    PlatformChannel {
        id: id.to_string(),
        name: name.to_string(),
    }
}

#[derive(Default)]
pub struct FakePlatform {
    pub users: Vec<PlatformUser>,
    pub channels: Vec<PlatformChannel>,
    pub groups: Vec<PlatformChannel>,
    pub fail_users: bool,
    pub fail_channels: bool,
    pub fail_sends: bool,
    pub sent: Mutex<Vec<(String, String)>>,
}

impl FakePlatform {
    /// A workspace with an admin, a regular user, and the bot `B1`.
    pub fn workspace() -> Self {
        Self {
            users: vec![
                user("U1", "alice", false, false),
                user("U2", "boss", false, true),
                user("B1", "golem", true, false),
            ],
            channels: vec![channel("C1", "General"), channel("C2", "unrelated")],
            groups: vec![channel("G1", "random"), channel("G2", "general")],
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, text)| text).collect()
    }

    pub fn clear_sent(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl Platform for FakePlatform {
    fn name(&self) -> &str {
        "fake"
    }

    async fn list_users(&self) -> Result<Vec<PlatformUser>> {
        if self.fail_users {
            return Err(Error::Slack("users.list failed: ratelimited".to_string()));
        }
        Ok(self.users.clone())
    }

    async fn list_channels(&self) -> Result<Vec<PlatformChannel>> {
        if self.fail_channels {
            return Err(Error::Slack("conversations.list failed".to_string()));
        }
        Ok(self.channels.clone())
    }

    async fn list_groups(&self) -> Result<Vec<PlatformChannel>> {
        Ok(self.groups.clone())
    }

    async fn post_message(&self, destination: &str, text: &str, _as_user: bool) -> Result<()> {
        if self.fail_sends {
            return Err(Error::Slack("chat.postMessage failed: channel_not_found".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((destination.to_string(), text.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeHost {
    pub failure: Option<String>,
    pub calls: Mutex<Vec<RepositoryRequest>>,
}

impl FakeHost {
    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<RepositoryRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RepositoryHost for FakeHost {
    fn name(&self) -> &str {
        "fake"
    }

    async fn create_repository(&self, request: &RepositoryRequest) -> Result<CreatedRepository> {
        self.calls.lock().unwrap().push(request.clone());
        match &self.failure {
            Some(reason) => Err(Error::Repository(reason.clone())),
            None => Ok(CreatedRepository {
                full_name: format!("acme/{}", request.name),
                url: Some(format!("https://github.com/acme/{}", request.name)),
            }),
        }
    }
}
