//! Repository hosts for the `git repository` command.

pub mod github;
pub mod host;

pub use github::GithubClient;
pub use host::{CreatedRepository, RepositoryHost, RepositoryRequest, UnconfiguredHost, Visibility};
