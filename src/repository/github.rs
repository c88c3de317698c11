//! GitHub REST client for repository creation.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::host::{CreatedRepository, RepositoryHost, RepositoryRequest, Visibility};
use crate::config::GithubConfig;
use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct GithubRepositoryResponse {
    full_name: String,
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubErrorResponse {
    message: Option<String>,
    #[serde(default)]
    errors: Vec<GithubErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GithubErrorDetail {
    message: Option<String>,
    code: Option<String>,
}

#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    organization: Option<String>,
}

impl GithubClient {
    pub fn new(
        api_base: &str,
        token: &str,
        organization: Option<String>,
        request_timeout_ms: u64,
    ) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("golem-bot"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            reqwest::header::HeaderValue::from_static("2022-11-28"),
        );
        let auth_header = format!("Bearer {}", token.trim());
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&auth_header)
                .map_err(|_| Error::Config("invalid github authorization header".to_string()))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            organization: organization
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty()),
        })
    }

    pub fn from_config(config: &GithubConfig) -> Result<Self> {
        Self::new(
            &config.api_base,
            config.require_token()?,
            config.organization.clone(),
            config.request_timeout_ms,
        )
    }

    fn create_url(&self) -> String {
        match &self.organization {
            Some(org) => format!("{}/orgs/{}/repos", self.api_base, org),
            None => format!("{}/user/repos", self.api_base),
        }
    }
}

/// Request body for the create-repository endpoints.
fn create_payload(request: &RepositoryRequest) -> Value {
    let mut payload = json!({
        "name": request.name,
        "private": request.scope != Visibility::Public,
        "visibility": request.scope.to_string(),
    });
    if let Some(description) = &request.description {
        payload["description"] = Value::String(description.clone());
    }
    payload
}

/// Human readable reason from a GitHub error body.
fn error_reason(status: reqwest::StatusCode, body: &str) -> String {
    let parsed = match serde_json::from_str::<GithubErrorResponse>(body) {
        Ok(p) => p,
        Err(_) => return format!("GitHub returned {}", status),
    };

    let detail = parsed
        .errors
        .iter()
        .filter_map(|e| e.message.clone().or_else(|| e.code.clone()))
        .collect::<Vec<_>>()
        .join(", ");

    match (parsed.message, detail.is_empty()) {
        (Some(message), true) => message,
        (Some(message), false) => format!("{} ({})", message, detail),
        (None, false) => detail,
        (None, true) => format!("GitHub returned {}", status),
    }
}

#[async_trait]
impl RepositoryHost for GithubClient {
    fn name(&self) -> &str {
        "github"
    }

    async fn create_repository(&self, request: &RepositoryRequest) -> Result<CreatedRepository> {
        let url = self.create_url();
        tracing::debug!("Creating repository {} via {}", request.name, url);

        let response = self
            .http
            .post(&url)
            .json(&create_payload(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Repository(error_reason(status, &body)));
        }

        let created: GithubRepositoryResponse = serde_json::from_str(&body)?;
        Ok(CreatedRepository {
            full_name: created.full_name,
            url: created.html_url,
        })
    }
}
