// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for multi-handle integration testing.
//!
//! `TestHarness` opens a temp SQLite database and mounts two contexts on it,
//! `tab_a` and `tab_b`, each with its own origin id and local channel, the
//! way two browser tabs share one storage partition. Each tab has a storage
//! watcher that the test drives explicitly with [`TestHarness::sync`].

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use cadence_config::model::{CadenceConfig, StorageConfig};
use cadence_core::{CadenceError, StorageKey};
use cadence_features::AppContext;
use cadence_storage::{SqliteBackend, Storage, StorageWatcher};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    namespace: String,
    seeds: Vec<(StorageKey, String)>,
    companion_url: Option<String>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            namespace: "cadence".to_string(),
            seeds: Vec::new(),
            companion_url: None,
        }
    }

    /// Use a different key namespace.
    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = namespace.to_string();
        self
    }

    /// Store `raw` under `key` before any tab mounts.
    pub fn with_seed(mut self, key: StorageKey, raw: impl Into<String>) -> Self {
        self.seeds.push((key, raw.into()));
        self
    }

    /// Point the companion config at a mock server.
    pub fn with_companion_url(mut self, url: &str) -> Self {
        self.companion_url = Some(url.to_string());
        self
    }

    /// Build the harness, creating the temp database and both tabs.
    pub fn build(self) -> Result<TestHarness, CadenceError> {
        let temp_dir = tempfile::TempDir::new().map_err(CadenceError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = CadenceConfig {
            storage: StorageConfig {
                database_path: db_path.to_string_lossy().to_string(),
                wal_mode: true,
                namespace: self.namespace,
            },
            ..CadenceConfig::default()
        };
        if let Some(url) = self.companion_url {
            config.companion.base_url = url;
        }

        let tab_a = AppContext::open(&config)?;
        for (key, raw) in &self.seeds {
            tab_a.storage.set(key, raw)?;
        }
        let tab_b = tab_a.share();

        let watcher_a = Mutex::new(tab_a.watcher()?);
        let watcher_b = Mutex::new(tab_b.watcher()?);

        Ok(TestHarness {
            config,
            tab_a,
            tab_b,
            watcher_a,
            watcher_b,
            db_path,
            _temp_dir: temp_dir,
        })
    }
}

/// Two tabs over one temp database.
pub struct TestHarness {
    /// Configuration pointing at the temp database.
    pub config: CadenceConfig,
    /// First tab.
    pub tab_a: AppContext,
    /// Second tab on the same backend.
    pub tab_b: AppContext,
    watcher_a: Mutex<StorageWatcher>,
    watcher_b: Mutex<StorageWatcher>,
    db_path: PathBuf,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn db_path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Delivers pending foreign writes to both tabs. Returns the event count.
    pub fn sync(&self) -> Result<usize, CadenceError> {
        Ok(self.sync_tab_a()? + self.sync_tab_b()?)
    }

    pub fn sync_tab_a(&self) -> Result<usize, CadenceError> {
        poll(&self.watcher_a)
    }

    pub fn sync_tab_b(&self) -> Result<usize, CadenceError> {
        poll(&self.watcher_b)
    }

    /// A context on its own database connection, like a second process.
    pub fn open_second_process(&self) -> Result<AppContext, CadenceError> {
        let backend = SqliteBackend::open(&self.config.storage.database_path, true)?;
        Ok(AppContext::new(Storage::new(
            Arc::new(backend),
            self.config.storage.namespace.clone(),
        )))
    }
}

fn poll(watcher: &Mutex<StorageWatcher>) -> Result<usize, CadenceError> {
    watcher
        .lock()
        .map_err(|_| CadenceError::Internal("watcher lock poisoned".into()))?
        .poll()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_are_visible_to_both_tabs_without_events() {
        let harness = TestHarness::builder()
            .with_seed(StorageKey::AllTasks, "[]")
            .build()
            .unwrap();
        assert_eq!(harness.tab_b.storage.get(&StorageKey::AllTasks).as_deref(), Some("[]"));
        assert_eq!(harness.sync().unwrap(), 0);
        assert!(harness.db_path().exists());
    }

    #[test]
    fn tabs_only_see_each_others_writes() {
        let harness = TestHarness::builder().build().unwrap();
        harness.tab_a.storage.set(&StorageKey::SidebarMenu, "{}").unwrap();
        assert_eq!(harness.sync_tab_a().unwrap(), 0);
        assert_eq!(harness.sync_tab_b().unwrap(), 1);
    }

    #[test]
    fn second_process_shares_the_file() {
        let harness = TestHarness::builder().with_namespace("qa").build().unwrap();
        let other = harness.open_second_process().unwrap();
        other.storage.set(&StorageKey::VisionBoard, "{}").unwrap();
        assert_eq!(harness.tab_a.storage.get(&StorageKey::VisionBoard).as_deref(), Some("{}"));
        assert_eq!(harness.sync().unwrap(), 2);
    }
}
