//! Message routing for Golem.
//!
//! Handles:
//! - Loop prevention (bot senders and bot subtypes)
//! - Addressing (internal prefix, bot name, direct message channel)
//! - Normalization of the addressed text
//! - Classification into structured command or lookup key

use crate::platform::InboundEvent;

/// Channel ids of direct message conversations start with this marker.
pub const DIRECT_MESSAGE_MARKER: &str = "D";

/// Subtype the platform puts on messages posted by integrations.
pub const BOT_MESSAGE_SUBTYPE: &str = "bot_message";

/// Token at `GIT_SENTINEL_INDEX` that marks a structured command.
pub const GIT_SENTINEL: &str = "git";
pub const GIT_SENTINEL_INDEX: usize = 3;

/// Why an event was dropped before addressing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterReason {
    MissingSender,
    BotSender,
    BotSubtype,
}

impl std::fmt::Display for FilterReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterReason::MissingSender => write!(f, "missing sender"),
            FilterReason::BotSender => write!(f, "bot sender"),
            FilterReason::BotSubtype => write!(f, "bot message subtype"),
        }
    }
}

/// Normalized text, split by how it will be answered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classified<'a> {
    /// Whitespace-split fields of a `... git ...` command.
    Structured(Vec<&'a str>),
    /// The whole text, used as a response table key.
    Lookup(&'a str),
}

/// Return the reason an event must be dropped, if any.
pub fn filter_reason(event: &InboundEvent) -> Option<FilterReason> {
    if event.user.is_empty() {
        return Some(FilterReason::MissingSender);
    }
    if event.is_bot {
        return Some(FilterReason::BotSender);
    }
    if event.subtype.as_deref() == Some(BOT_MESSAGE_SUBTYPE) {
        return Some(FilterReason::BotSubtype);
    }
    None
}

/// Lowercase and trim raw message text before addressing.
pub fn prepare_text(raw: &str) -> String {
    raw.to_lowercase()
        .trim_matches(|c: char| c == ' ' || c == '\n' || c == '\r')
        .to_string()
}

/// Whether the bot is addressed by `text` (already prepared) in `channel`.
///
/// Direct messages are always addressed. Empty prefix or name never match.
///
/// # Examples
///
/// ```
/// use golem::core::routing::is_addressed;
///
/// assert!(is_addressed("C1", "golem help", "", "golem"));
/// assert!(is_addressed("D1", "help", "", "golem"));
/// assert!(!is_addressed("C1", "help", "", "golem"));
/// ```
pub fn is_addressed(channel: &str, text: &str, prefix: &str, name: &str) -> bool {
    if channel.starts_with(DIRECT_MESSAGE_MARKER) {
        return true;
    }
    [prefix, name]
        .iter()
        .map(|p| p.to_lowercase())
        .any(|p| !p.is_empty() && text.starts_with(&p))
}

/// Strip the internal prefix and then the bot mention from the start of
/// `text`, each at most once, and trim spaces, colons and line breaks.
///
/// # Examples
///
/// ```
/// use golem::core::routing::normalize;
///
/// assert_eq!(normalize("golem <@b1>: help\n", "golem ", "<@b1>"), "help");
/// assert_eq!(normalize("<@b1> help", "", "<@b1>"), "help");
/// ```
pub fn normalize(text: &str, prefix: &str, mention: &str) -> String {
    let prefix = prefix.to_lowercase();
    let mention = mention.to_lowercase();

    let mut rest = text;
    if !prefix.is_empty() {
        rest = rest.strip_prefix(prefix.as_str()).unwrap_or(rest);
    }
    if !mention.is_empty() {
        rest = rest.strip_prefix(mention.as_str()).unwrap_or(rest);
    }
    rest.trim_matches(|c: char| matches!(c, ' ' | ':' | '\n' | '\r'))
        .to_string()
}

/// Classify normalized text.
///
/// More than three fields with `git` at index 3 is a structured command;
/// anything else is looked up verbatim.
pub fn classify(text: &str) -> Classified<'_> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() > GIT_SENTINEL_INDEX && fields[GIT_SENTINEL_INDEX] == GIT_SENTINEL {
        Classified::Structured(fields)
    } else {
        Classified::Lookup(text)
    }
}
