// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-local [`KeyValueBackend`] for tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use cadence_core::{CadenceError, ChangeRecord, KeyValueBackend};

use crate::database::CHANGE_LOG_RETENTION;

#[derive(Default)]
struct MemoryState {
    values: HashMap<String, String>,
    changes: Vec<(i64, String, String)>,
    next_seq: i64,
}

/// A `HashMap`-backed store with the same change log semantics as SQLite.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MemoryState {
    fn log(&mut self, key: &str, origin: &str) {
        self.next_seq += 1;
        self.changes
            .push((self.next_seq, key.to_string(), origin.to_string()));
        let floor = self.next_seq - CHANGE_LOG_RETENTION;
        self.changes.retain(|(seq, _, _)| *seq > floor);
    }
}

impl KeyValueBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn read(&self, key: &str) -> Result<Option<String>, CadenceError> {
        Ok(self.lock().values.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str, origin: &str) -> Result<(), CadenceError> {
        let mut state = self.lock();
        state.values.insert(key.to_string(), value.to_string());
        state.log(key, origin);
        Ok(())
    }

    fn delete(&self, key: &str, origin: &str) -> Result<(), CadenceError> {
        let mut state = self.lock();
        if state.values.remove(key).is_some() {
            state.log(key, origin);
        }
        Ok(())
    }

    fn latest_change(&self) -> Result<i64, CadenceError> {
        Ok(self.lock().next_seq)
    }

    fn changes_since(&self, after: i64) -> Result<Vec<ChangeRecord>, CadenceError> {
        let state = self.lock();
        Ok(state
            .changes
            .iter()
            .filter(|(seq, _, _)| *seq > after)
            .map(|(seq, key, origin)| ChangeRecord {
                seq: *seq,
                key: key.clone(),
                origin: origin.clone(),
                value: state.values.get(key).cloned(),
            })
            .collect())
    }

    fn entries(&self, prefix: &str) -> Result<Vec<(String, String)>, CadenceError> {
        let state = self.lock();
        let mut found: Vec<(String, String)> = state
            .values
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        found.sort();
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_sqlite_change_log_semantics() {
        let backend = MemoryBackend::new();
        backend.write("a", "1", "tab-a").unwrap();
        backend.delete("missing", "tab-a").unwrap();
        backend.delete("a", "tab-b").unwrap();

        let changes = backend.changes_since(0).unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[1].origin, "tab-b");
        assert_eq!(changes[1].value, None);
        assert_eq!(backend.latest_change().unwrap(), 2);
    }

    #[test]
    fn change_log_is_pruned_like_sqlite() {
        let backend = MemoryBackend::new();
        for i in 0..=CHANGE_LOG_RETENTION {
            backend.write("k", &i.to_string(), "tab-a").unwrap();
        }
        let changes = backend.changes_since(0).unwrap();
        assert_eq!(changes.len() as i64, CHANGE_LOG_RETENTION);
        assert_eq!(changes[0].seq, 2);
    }

    #[test]
    fn entries_filters_by_prefix_in_key_order() {
        let backend = MemoryBackend::new();
        backend.write("cadence:b", "2", "tab-a").unwrap();
        backend.write("other:a", "x", "tab-a").unwrap();
        backend.write("cadence:a", "1", "tab-a").unwrap();
        assert_eq!(
            backend.entries("cadence:").unwrap(),
            vec![
                ("cadence:a".to_string(), "1".to_string()),
                ("cadence:b".to_string(), "2".to_string())
            ]
        );
    }
}
