// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live, self-syncing view of one persisted document.
//!
//! A [`PersistedState`] goes through three states:
//!
//! - **hydrate**: the document is read straight from storage while the
//!   handle is constructed, so the first read already sees persisted data.
//! - **hydrated**: the in-memory copy is the working state. It only reaches
//!   storage through an explicit [`PersistedState::save`] (or a helper built
//!   on it); nothing writes automatically when the state changes.
//! - **externally updated**: a change event for this key on either channel
//!   replaces the in-memory copy wholesale with the decoded payload.
//!
//! Saves write durably first, then emit on the local channel. Every handle
//! subscribed to the key, including the saving one, then decodes the same
//! stored text, so re-delivery is harmless.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use cadence_bus::{StorageEvent, Subscription};
use cadence_core::{CadenceError, StorageKey};
use cadence_storage::{decode, Document};
use tracing::{debug, warn};

use crate::context::AppContext;

struct Shared<D> {
    document: RwLock<D>,
    revision: AtomicU64,
}

impl<D> Shared<D> {
    fn read(&self) -> RwLockReadGuard<'_, D> {
        self.document.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn replace(&self, next: D) {
        *self.write() = next;
        self.revision.fetch_add(1, Ordering::SeqCst);
    }

    fn write(&self) -> RwLockWriteGuard<'_, D> {
        self.document.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A mounted document: in-memory copy, explicit saves, external-update sync.
///
/// Dropping the handle unsubscribes it from both channels.
pub struct PersistedState<D: Document> {
    key: StorageKey,
    ctx: AppContext,
    shared: Arc<Shared<D>>,
    _subscriptions: [Subscription; 2],
}

impl<D: Document> PersistedState<D> {
    /// Mounts the document stored under `key`.
    pub fn hydrate(ctx: &AppContext, key: StorageKey) -> Self {
        Self::hydrate_with(ctx, key, |_| false)
    }

    /// Mounts the document and runs `repair` over it once.
    ///
    /// `repair` returns whether it changed anything. Only then is the repaired
    /// document saved; otherwise the state is left exactly as loaded.
    pub fn hydrate_with<F>(ctx: &AppContext, key: StorageKey, repair: F) -> Self
    where
        F: FnOnce(&mut D) -> bool,
    {
        let mut document: D = ctx.storage.load_document(&key);
        let needs_save = repair(&mut document);

        let shared = Arc::new(Shared {
            document: RwLock::new(document),
            revision: AtomicU64::new(0),
        });
        let handler = external_update_handler(key.clone(), Arc::downgrade(&shared));
        let subscriptions = ctx.channels.subscribe_both(key.topic(), handler);

        let state = Self {
            key,
            ctx: ctx.clone(),
            shared,
            _subscriptions: subscriptions,
        };

        if needs_save {
            let repaired = state.snapshot();
            match state.save(repaired) {
                Ok(()) => debug!(key = %state.key, "repaired document saved"),
                Err(e) => warn!(key = %state.key, error = %e, "failed to save repaired document"),
            }
        }
        state
    }

    /// Key this handle is bound to.
    pub fn key(&self) -> &StorageKey {
        &self.key
    }

    /// Clone of the current in-memory document.
    pub fn snapshot(&self) -> D {
        self.shared.read().clone()
    }

    /// Runs `f` against the current document without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&D) -> R) -> R {
        f(&self.shared.read())
    }

    /// Number of times the in-memory document has been replaced since mount.
    pub fn revision(&self) -> u64 {
        self.shared.revision.load(Ordering::SeqCst)
    }

    /// Persists `next` as the authoritative document and announces it.
    pub fn save(&self, next: D) -> Result<(), CadenceError> {
        let raw = self.ctx.storage.save_document(&self.key, &next)?;
        self.shared.replace(next);
        self.ctx.channels.local.emit(
            self.key.topic(),
            &StorageEvent {
                key: self.key.clone(),
                new_value: Some(raw),
                origin: self.ctx.storage.origin().to_string(),
            },
        );
        Ok(())
    }

    /// Applies `f` to a copy of the document and saves the result.
    ///
    /// If `f` fails, nothing is written and the in-memory copy is untouched.
    pub fn modify<T>(
        &self,
        f: impl FnOnce(&mut D) -> Result<T, CadenceError>,
    ) -> Result<T, CadenceError> {
        let mut next = self.snapshot();
        let out = f(&mut next)?;
        self.save(next)?;
        Ok(out)
    }

    /// Removes the stored document and resets to the default.
    pub fn clear(&self) -> Result<(), CadenceError> {
        self.ctx.storage.remove(&self.key)?;
        self.shared.replace(D::default());
        self.ctx.channels.local.emit(
            self.key.topic(),
            &StorageEvent {
                key: self.key.clone(),
                new_value: None,
                origin: self.ctx.storage.origin().to_string(),
            },
        );
        Ok(())
    }
}

fn external_update_handler<D: Document>(
    key: StorageKey,
    target: Weak<Shared<D>>,
) -> impl Fn(&StorageEvent) + Send + Sync + 'static {
    move |event| {
        // Topics can be shared by several keys (per-user onboarding flags).
        if event.key != key {
            return;
        }
        let Some(shared) = target.upgrade() else {
            return;
        };
        let next = match &event.new_value {
            None => D::default(),
            Some(raw) => match decode::<D>(raw) {
                Ok(decoded) => decoded.document,
                Err(e) => {
                    warn!(key = %key, error = %e, "ignoring unreadable update");
                    return;
                }
            },
        };
        shared.replace(next);
        debug!(key = %key, origin = %event.origin, "state replaced from update");
    }
}

impl<D: Document + std::fmt::Debug> std::fmt::Debug for PersistedState<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedState")
            .field("key", &self.key)
            .field("revision", &self.revision())
            .field("document", &*self.shared.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Tasks = Vec<String>;

    #[test]
    fn hydrate_reads_persisted_value_immediately() {
        let ctx = AppContext::in_memory();
        ctx.storage
            .set_json(&StorageKey::AllTasks, &vec!["edit vlog"])
            .unwrap();

        let state: PersistedState<Tasks> = PersistedState::hydrate(&ctx, StorageKey::AllTasks);
        assert_eq!(state.snapshot(), vec!["edit vlog"]);
        assert_eq!(state.revision(), 0);
    }

    #[test]
    fn hydrate_on_corrupt_value_falls_back_to_default() {
        let ctx = AppContext::in_memory();
        ctx.storage.set(&StorageKey::AllTasks, "not json").unwrap();
        let state: PersistedState<Tasks> = PersistedState::hydrate(&ctx, StorageKey::AllTasks);
        assert!(state.snapshot().is_empty());
    }

    #[test]
    fn save_updates_sibling_handles_synchronously() {
        let ctx = AppContext::in_memory();
        let a: PersistedState<Tasks> = PersistedState::hydrate(&ctx, StorageKey::AllTasks);
        let b: PersistedState<Tasks> = PersistedState::hydrate(&ctx, StorageKey::AllTasks);

        a.save(vec!["post reel".into()]).unwrap();
        assert_eq!(b.snapshot(), vec!["post reel"]);
        assert_eq!(b.revision(), 1);
    }

    #[test]
    fn save_is_durable_before_notification() {
        let ctx = AppContext::in_memory();
        let a: PersistedState<Tasks> = PersistedState::hydrate(&ctx, StorageKey::AllTasks);

        let storage = ctx.storage.clone();
        let observed = Arc::new(std::sync::Mutex::new(None));
        let o = Arc::clone(&observed);
        let _listener = ctx.channels.local.on(cadence_core::Topic::AllTasks, move |_| {
            *o.lock().unwrap() = Some(storage.load_document::<Tasks>(&StorageKey::AllTasks));
        });

        a.save(vec!["x".into()]).unwrap();
        assert_eq!(observed.lock().unwrap().clone(), Some(vec!["x".to_string()]));
    }

    #[test]
    fn modify_failure_leaves_state_and_storage_untouched() {
        let ctx = AppContext::in_memory();
        let state: PersistedState<Tasks> = PersistedState::hydrate(&ctx, StorageKey::AllTasks);
        state.save(vec!["keep".into()]).unwrap();

        let result: Result<(), _> = state.modify(|tasks| {
            tasks.clear();
            Err(CadenceError::Validation("nope".into()))
        });
        assert!(result.is_err());
        assert_eq!(state.snapshot(), vec!["keep"]);
        let stored: Tasks = ctx.storage.load_document(&StorageKey::AllTasks);
        assert_eq!(stored, vec!["keep"]);
    }

    #[test]
    fn repair_saves_only_when_needed() {
        let ctx = AppContext::in_memory();
        ctx.storage
            .set_json(&StorageKey::AllTasks, &vec![" padded "])
            .unwrap();

        let trim = |tasks: &mut Tasks| {
            let mut changed = false;
            for t in tasks.iter_mut() {
                if t.trim() != t {
                    *t = t.trim().to_string();
                    changed = true;
                }
            }
            changed
        };

        let first: PersistedState<Tasks> =
            PersistedState::hydrate_with(&ctx, StorageKey::AllTasks, trim);
        assert_eq!(first.snapshot(), vec!["padded"]);
        let seq_after_repair = ctx.storage.backend().latest_change().unwrap();

        let _second: PersistedState<Tasks> =
            PersistedState::hydrate_with(&ctx, StorageKey::AllTasks, trim);
        assert_eq!(ctx.storage.backend().latest_change().unwrap(), seq_after_repair);
    }

    #[test]
    fn clear_resets_everyone() {
        let ctx = AppContext::in_memory();
        let a: PersistedState<Tasks> = PersistedState::hydrate(&ctx, StorageKey::AllTasks);
        let b: PersistedState<Tasks> = PersistedState::hydrate(&ctx, StorageKey::AllTasks);
        a.save(vec!["x".into()]).unwrap();

        a.clear().unwrap();
        assert!(b.snapshot().is_empty());
        assert_eq!(ctx.storage.get(&StorageKey::AllTasks), None);
    }

    #[test]
    fn dropped_handle_stops_listening() {
        let ctx = AppContext::in_memory();
        let a: PersistedState<Tasks> = PersistedState::hydrate(&ctx, StorageKey::AllTasks);
        {
            let _b: PersistedState<Tasks> = PersistedState::hydrate(&ctx, StorageKey::AllTasks);
            assert_eq!(ctx.channels.local.subscriber_count(cadence_core::Topic::AllTasks), 2);
        }
        assert_eq!(ctx.channels.local.subscriber_count(cadence_core::Topic::AllTasks), 1);
        a.save(vec![]).unwrap();
    }

    #[test]
    fn unreadable_update_is_ignored() {
        let ctx = AppContext::in_memory();
        let a: PersistedState<Tasks> = PersistedState::hydrate(&ctx, StorageKey::AllTasks);
        a.save(vec!["keep".into()]).unwrap();

        ctx.channels.storage.emit(
            cadence_core::Topic::AllTasks,
            &StorageEvent {
                key: StorageKey::AllTasks,
                new_value: Some("{broken".into()),
                origin: "elsewhere".into(),
            },
        );
        assert_eq!(a.snapshot(), vec!["keep"]);
    }
}
