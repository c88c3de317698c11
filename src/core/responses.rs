//! Response table: normalized command key to canned replies.
//!
//! Lookups take the read lock; `set_responses`, `add_response` and `clear`
//! take the write lock. The admin API may write while the dispatcher reads.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Error, Result};

pub type Responses = HashMap<String, Vec<String>>;

#[derive(Debug, Default)]
pub struct ResponseTable {
    entries: RwLock<Responses>,
}

impl ResponseTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Responses> {
        self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Responses> {
        self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Load a table. An empty table is replaced wholesale; a non-empty one
    /// only has the incoming keys overwritten. Use `clear` first for a full
    /// replacement.
    pub fn set_responses(&self, table: Responses) {
        let mut entries = self.write();
        if entries.is_empty() {
            tracing::info!("Loaded {} response keys", table.len());
            *entries = table;
        } else {
            tracing::info!("Merging {} response keys", table.len());
            for (key, replies) in table {
                entries.insert(key, replies);
            }
        }
    }

    /// Add a reply under a key that does not exist yet. Existing keys are
    /// never touched.
    pub fn add_response(&self, key: &str, text: &str) -> Result<()> {
        let mut entries = self.write();
        if entries.contains_key(key) {
            tracing::warn!("Could not add response for '{}', key already present", key);
            return Err(Error::DuplicateResponseKey(key.to_string()));
        }
        entries.insert(key.to_string(), vec![text.to_string()]);
        Ok(())
    }

    /// Replies stored for a key, in order. Empty when the key is unknown.
    pub fn lookup(&self, key: &str) -> Vec<String> {
        self.read().get(key).cloned().unwrap_or_default()
    }

    pub fn snapshot(&self) -> Responses {
        self.read().clone()
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(&str, &[&str])]) -> Responses {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_first_load_replaces() {
        let responses = ResponseTable::new();
        responses.set_responses(table(&[("help", &["try: status", "try: deploy"])]));

        assert_eq!(responses.lookup("help"), vec!["try: status", "try: deploy"]);
        assert!(responses.lookup("status").is_empty());
    }

    #[test]
    fn test_second_load_merges() {
        let responses = ResponseTable::new();
        responses.set_responses(table(&[("help", &["a"]), ("ping", &["pong"])]));
        responses.set_responses(table(&[("help", &["b"]), ("hi", &["hello"])]));

        assert_eq!(responses.lookup("help"), vec!["b"]);
        assert_eq!(responses.lookup("ping"), vec!["pong"]);
        assert_eq!(responses.lookup("hi"), vec!["hello"]);
        assert_eq!(responses.len(), 3);
    }

    #[test]
    fn test_clear_allows_full_replacement() {
        let responses = ResponseTable::new();
        responses.set_responses(table(&[("ping", &["pong"])]));
        responses.clear();
        responses.set_responses(table(&[("help", &["a"])]));

        assert!(responses.lookup("ping").is_empty());
        assert_eq!(responses.len(), 1);
    }

    #[test]
    fn test_add_response_never_mutates_existing_key() {
        let responses = ResponseTable::new();
        responses.set_responses(table(&[("help", &["a"])]));

        let err = responses.add_response("help", "b").unwrap_err();
        assert!(matches!(err, Error::DuplicateResponseKey(k) if k == "help"));
        assert_eq!(responses.lookup("help"), vec!["a"]);

        responses.add_response("ping", "pong").unwrap();
        assert_eq!(responses.lookup("ping"), vec!["pong"]);
    }

    #[test]
    fn test_empty_sequence_is_not_known() {
        let responses = ResponseTable::new();
        responses.set_responses(table(&[("silent", &[])]));

        assert!(responses.lookup("silent").is_empty());
        assert!(responses.add_response("silent", "x").is_err());
    }

    #[test]
    fn test_concurrent_readers_and_writer() {
        use std::sync::Arc;

        let responses = Arc::new(ResponseTable::new());
        responses.set_responses(table(&[("help", &["a"])]));

        let writer = {
            let responses = Arc::clone(&responses);
            std::thread::spawn(move || {
                for i in 0..100 {
                    let _ = responses.add_response(&format!("k{}", i), "v");
                }
            })
        };
        for _ in 0..100 {
            assert_eq!(responses.lookup("help"), vec!["a"]);
        }
        writer.join().unwrap();
        assert_eq!(responses.len(), 101);
    }
}
