//! Bot identity resolution from a snapshot of workspace users.

use crate::error::{Error, Result};
use crate::platform::PlatformUser;

/// Who the bot is, and who administers it.
#[derive(Clone, Debug, PartialEq)]
pub struct Identity {
    pub bot_id: String,
    /// Lowercased mention form of the bot, `<@id>`.
    pub alias: String,
    pub admin_id: Option<String>,
    pub admin_name: Option<String>,
}

/// Mention-style self reference for a platform id.
pub fn mention_for(bot_id: &str) -> String {
    format!("<@{}>", bot_id).to_lowercase()
}

/// Pick the bot's own entry and the administrator out of the user list.
///
/// A bot user whose name matches `bot_name` wins; otherwise the first bot
/// user is taken. The administrator is the first non-bot admin.
pub fn resolve_identity(users: &[PlatformUser], bot_name: &str) -> Result<Identity> {
    let bots: Vec<&PlatformUser> = users.iter().filter(|u| u.is_bot).collect();
    let me = bots
        .iter()
        .find(|u| u.name.eq_ignore_ascii_case(bot_name.trim()))
        .or_else(|| bots.first())
        .filter(|u| !u.id.is_empty())
        .ok_or_else(|| {
            Error::Initialization("Unable to find bot in the list of users".to_string())
        })?;

    let admin = users.iter().find(|u| !u.is_bot && u.is_admin);

    Ok(Identity {
        bot_id: me.id.clone(),
        alias: mention_for(&me.id),
        admin_id: admin.map(|u| u.id.clone()),
        admin_name: admin.map(|u| u.name.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, name: &str, is_bot: bool, is_admin: bool) -> PlatformUser {
        PlatformUser {
            id: id.to_string(),
            name: name.to_string(),
            is_bot,
            is_admin,
        }
    }

    #[test]
    fn test_resolves_bot_and_admin() {
        let users = vec![
            user("U1", "alice", false, false),
            user("U2", "bob", false, true),
            user("B1", "golem", true, false),
        ];

        let identity = resolve_identity(&users, "golem").unwrap();
        assert_eq!(identity.bot_id, "B1");
        assert_eq!(identity.alias, "<@b1>");
        assert_eq!(identity.admin_id.as_deref(), Some("U2"));
        assert_eq!(identity.admin_name.as_deref(), Some("bob"));
    }

    #[test]
    fn test_prefers_bot_with_matching_name() {
        let users = vec![
            user("B0", "jira", true, false),
            user("B1", "Golem", true, false),
        ];
        assert_eq!(resolve_identity(&users, "golem").unwrap().bot_id, "B1");
        assert_eq!(resolve_identity(&users, "other").unwrap().bot_id, "B0");
    }

    #[test]
    fn test_no_bot_is_initialization_error() {
        let users = vec![user("U1", "alice", false, true)];
        let err = resolve_identity(&users, "golem").unwrap_err();
        assert!(matches!(err, Error::Initialization(_)));
    }

    #[test]
    fn test_admin_is_optional() {
        let users = vec![user("B1", "golem", true, true)];
        let identity = resolve_identity(&users, "golem").unwrap();
        assert!(identity.admin_id.is_none());
    }
}
