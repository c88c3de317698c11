//! Repository host trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Requested visibility of a new repository.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Internal,
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
            Visibility::Internal => write!(f, "internal"),
        }
    }
}

impl std::str::FromStr for Visibility {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            "internal" => Ok(Visibility::Internal),
            other => Err(Error::malformed(format!("unknown visibility '{}'", other))),
        }
    }
}

/// What to create.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositoryRequest {
    pub name: String,
    pub scope: Visibility,
    pub description: Option<String>,
}

/// What was created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedRepository {
    pub full_name: String,
    pub url: Option<String>,
}

#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Host name, for logs.
    fn name(&self) -> &str;

    async fn create_repository(&self, request: &RepositoryRequest) -> Result<CreatedRepository>;
}

/// Stand-in host used when no credentials are configured.
pub struct UnconfiguredHost;

#[async_trait]
impl RepositoryHost for UnconfiguredHost {
    fn name(&self) -> &str {
        "unconfigured"
    }

    async fn create_repository(&self, _request: &RepositoryRequest) -> Result<CreatedRepository> {
        Err(Error::Repository(
            "no repository host is configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_parse() {
        assert_eq!("public".parse::<Visibility>().unwrap(), Visibility::Public);
        assert_eq!("PRIVATE".parse::<Visibility>().unwrap(), Visibility::Private);
        assert_eq!("internal".parse::<Visibility>().unwrap(), Visibility::Internal);
        assert!(matches!(
            "new".parse::<Visibility>(),
            Err(Error::MalformedCommand(_))
        ));
    }

    #[tokio::test]
    async fn test_unconfigured_host_refuses() {
        let request = RepositoryRequest {
            name: "demo".to_string(),
            scope: Visibility::Public,
            description: None,
        };
        let err = UnconfiguredHost.create_repository(&request).await.unwrap_err();
        assert!(matches!(err, Error::Repository(_)));
    }
}
