//! Channel registry: well-known channels keyed by lowercase name.

use std::collections::HashMap;

use crate::config::ChannelSeed;

/// A channel or private group the bot knows by name.
#[derive(Clone, Debug, PartialEq)]
pub struct Channel {
    /// Platform id, `None` until the platform confirms the channel exists.
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub welcome: bool,
    pub special: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ChannelRegistry {
    channels: HashMap<String, Channel>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seeds(seeds: &[ChannelSeed]) -> Self {
        let mut registry = Self::new();
        for seed in seeds {
            registry.register(&seed.name, &seed.description, seed.welcome, seed.special);
        }
        registry
    }

    /// Register a channel with an unresolved id. Re-registering a name
    /// replaces its metadata but keeps an id that was already resolved.
    pub fn register(&mut self, name: &str, description: &str, welcome: bool, special: bool) {
        let key = name.trim().to_lowercase();
        let id = self.channels.get(&key).and_then(|c| c.id.clone());
        self.channels.insert(
            key.clone(),
            Channel {
                id,
                name: key,
                description: description.to_string(),
                welcome,
                special,
            },
        );
    }

    /// Fill in the platform id for a registered channel.
    ///
    /// Returns `false` when the name is unknown or the id is already set;
    /// a resolved id is never overwritten.
    pub fn resolve_id(&mut self, name: &str, platform_id: &str) -> bool {
        if platform_id.is_empty() {
            return false;
        }
        match self.channels.get_mut(&name.trim().to_lowercase()) {
            Some(channel) if channel.id.is_none() => {
                channel.id = Some(platform_id.to_string());
                true
            }
            _ => false,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Channel> {
        self.channels.get(&name.trim().to_lowercase())
    }

    /// Channels whose id is still unknown, sorted by name.
    pub fn unresolved(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .channels
            .values()
            .filter(|c| c.id.is_none())
            .map(|c| c.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup_case_insensitive() {
        let mut registry = ChannelRegistry::new();
        registry.register("General", "For general discussions", true, false);

        let channel = registry.lookup("GENERAL").unwrap();
        assert_eq!(channel.name, "general");
        assert!(channel.welcome);
        assert!(channel.id.is_none());
        assert!(registry.lookup("random").is_none());
    }

    #[test]
    fn test_resolve_id_only_once() {
        let mut registry = ChannelRegistry::new();
        registry.register("ops", "", false, true);

        assert!(registry.resolve_id("Ops", "C1"));
        assert!(!registry.resolve_id("ops", "G9"));
        assert_eq!(registry.lookup("ops").unwrap().id.as_deref(), Some("C1"));
    }

    #[test]
    fn test_resolve_unknown_is_noop() {
        let mut registry = ChannelRegistry::new();
        assert!(!registry.resolve_id("nowhere", "C1"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reregister_keeps_resolved_id() {
        let mut registry = ChannelRegistry::new();
        registry.register("ops", "", false, false);
        registry.resolve_id("ops", "C1");
        registry.register("ops", "Operations", true, false);

        let channel = registry.lookup("ops").unwrap();
        assert_eq!(channel.id.as_deref(), Some("C1"));
        assert_eq!(channel.description, "Operations");
    }

    #[test]
    fn test_unresolved_sorted() {
        let mut registry = ChannelRegistry::new();
        registry.register("random", "", true, false);
        registry.register("general", "", true, false);
        registry.register("ops", "", false, false);
        registry.resolve_id("ops", "C1");

        assert_eq!(registry.unresolved(), vec!["general", "random"]);
    }
}
