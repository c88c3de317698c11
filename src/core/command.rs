//! Structured command grammar.
//!
//! Commands read as `create a <scope> git repository <name>` with an
//! optional `with description <text>` tail. Fields are counted after
//! normalization:
//!
//! | index | meaning                  |
//! |-------|--------------------------|
//! | 2     | visibility scope         |
//! | 3     | `git` sentinel           |
//! | 4     | subcommand, `repository` |
//! | 5     | repository name          |
//! | 8     | description (optional)   |

use std::sync::OnceLock;

use regex::Regex;

use super::routing::{GIT_SENTINEL, GIT_SENTINEL_INDEX};
use crate::error::{Error, Result};
use crate::repository::{RepositoryRequest, Visibility};

const SCOPE_INDEX: usize = 2;
const SUBCOMMAND_INDEX: usize = 4;
const NAME_INDEX: usize = 5;
const DESCRIPTION_INDEX: usize = 8;
/// Field counts above this carry a description.
const BASE_ARITY: usize = 6;

const REPOSITORY_SUBCOMMAND: &str = "repository";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StructuredCommand {
    CreateRepository(RepositoryRequest),
}

/// Parse the whitespace-split fields of a structured command.
pub fn parse_command(fields: &[&str]) -> Result<StructuredCommand> {
    if fields.get(GIT_SENTINEL_INDEX) != Some(&GIT_SENTINEL) {
        return Err(Error::malformed("not a git command"));
    }

    match fields.get(SUBCOMMAND_INDEX) {
        Some(&REPOSITORY_SUBCOMMAND) => parse_create_repository(fields),
        Some(other) => Err(Error::malformed(format!("unknown subcommand '{}'", other))),
        None => Err(Error::malformed("missing subcommand")),
    }
}

fn parse_create_repository(fields: &[&str]) -> Result<StructuredCommand> {
    let name = fields
        .get(NAME_INDEX)
        .ok_or_else(|| Error::malformed("missing repository name"))?;
    if !is_valid_repository_name(name) {
        return Err(Error::malformed(format!("invalid repository name '{}'", name)));
    }

    let scope: Visibility = fields[SCOPE_INDEX].parse()?;

    let description = if fields.len() > BASE_ARITY {
        let text = fields.get(DESCRIPTION_INDEX).ok_or_else(|| {
            Error::malformed(format!(
                "expected a description at field {}, got {} fields",
                DESCRIPTION_INDEX,
                fields.len()
            ))
        })?;
        Some(text.trim_matches('"').to_string())
    } else {
        None
    };

    Ok(StructuredCommand::CreateRepository(RepositoryRequest {
        name: name.to_string(),
        scope,
        description,
    }))
}

fn repository_name_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9._-]{1,100}$").ok())
        .as_ref()
}

/// GitHub-compatible repository name.
fn is_valid_repository_name(name: &str) -> bool {
    repository_name_pattern().is_some_and(|re| re.is_match(name)) && name != "." && name != ".."
}
