//! Optimistic mutations with snapshot rollback.
//!
//! A mutation is applied to the local store immediately, then confirmed
//! remotely. The pre-mutation value of the target (its snapshot) is held
//! until the confirmation resolves: success discards it, failure writes it
//! back verbatim.
//!
//! Mutations on the same entity may overlap. Each entity keeps a stack of
//! pending slots, oldest first. A slot's base is the value the entity falls
//! back to if that mutation fails:
//!
//! - the newest slot failing restores its base;
//! - an older slot failing hands its base to the next-newer slot and leaves
//!   the store alone, since a newer value is on screen;
//! - a slot succeeding hands the value it wrote to the next-newer slot and
//!   marks every older slot superseded (their outcome no longer matters).
//!
//! So whatever order confirmations arrive in, the store ends up at the
//! value the server holds.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

/// Capture and restore the value of one addressable entity in a store.
pub trait Memento<K> {
    type Snapshot: PartialEq + Send + 'static;

    fn capture(&self, key: &K) -> Self::Snapshot;

    fn restore(&mut self, key: &K, snapshot: Self::Snapshot);
}

/// How an optimistic mutation settled (failures are the `Err` side)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Remote confirmed; the optimistic value is final
    Committed,
    /// The mutation left the entity unchanged; nothing was sent
    Unchanged,
    /// The session ended while the mutation was in flight; the store was
    /// reset underneath it and is left alone
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Confirmed,
    Rejected,
}

type ErasedSnapshot = Box<dyn Any + Send>;

/// Entity address: key type plus rendered key
type SlotKey = (TypeId, String);

/// One unresolved mutation on an entity
struct Slot {
    id: u64,
    base: ErasedSnapshot,
    applied: ErasedSnapshot,
    superseded: bool,
}

/// Owns a store and mediates every optimistic write into it.
pub struct OptimisticController<S> {
    state: Mutex<S>,
    /// Bumped on logout so late resolutions are reported as abandoned
    epoch: AtomicU64,
    next_id: AtomicU64,
    pending: Mutex<HashMap<SlotKey, Vec<Slot>>>,
}

impl<S> OptimisticController<S> {
    pub fn new(state: S) -> Self {
        OptimisticController {
            state: Mutex::new(state),
            epoch: AtomicU64::new(0),
            next_id: AtomicU64::new(0),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Read the store. The closure runs under the store lock, so it sees
    /// either the pre- or post-rollback value, never a torn one.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.lock())
    }

    /// Replace the whole store (initial load, reload after logout).
    /// Returns the previous store.
    pub fn replace(&self, state: S) -> S {
        std::mem::replace(&mut *self.lock(), state)
    }

    /// Forget every in-flight mutation: whatever they resolve to, they will
    /// neither commit nor roll back.
    pub fn abandon_in_flight(&self) {
        let previous = self.epoch.fetch_add(1, Ordering::SeqCst);
        lock_pending(&self.pending).clear();
        debug!(epoch = previous + 1, "abandoning in-flight optimistic mutations");
    }

    /// Number of unresolved mutations targeting `key`
    pub fn in_flight<K: Display + 'static>(&self, key: &K) -> usize {
        lock_pending(&self.pending)
            .get(&slot_key(key))
            .map_or(0, Vec::len)
    }

    fn lock(&self) -> MutexGuard<'_, S> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `mutate_local` now, then await `confirm_remote`.
    ///
    /// - If `mutate_local` fails, the snapshot is restored and its error is
    ///   returned without calling the remote.
    /// - If the mutation leaves the target value-identical, returns
    ///   `Outcome::Unchanged` without calling the remote.
    /// - If `confirm_remote` fails, the target rolls back (see the module
    ///   docs for overlapping mutations) and the remote error is returned.
    ///
    /// Dropping the returned future before it resolves counts as a failure.
    pub async fn apply<K, M, C, Fut, E>(
        &self,
        key: K,
        mutate_local: M,
        confirm_remote: C,
    ) -> Result<Outcome, E>
    where
        S: Memento<K>,
        K: Display + 'static,
        M: FnOnce(&mut S) -> Result<(), E>,
        C: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let address = slot_key(&key);
        {
            let mut state = self.lock();
            let snapshot = state.capture(&key);
            if let Err(err) = mutate_local(&mut state) {
                state.restore(&key, snapshot);
                return Err(err);
            }
            let applied = state.capture(&key);
            if applied == snapshot {
                debug!(entity = %key, "mutation is a no-op, skipping remote call");
                return Ok(Outcome::Unchanged);
            }
            lock_pending(&self.pending)
                .entry(address.clone())
                .or_default()
                .push(Slot {
                    id,
                    base: Box::new(snapshot),
                    applied: Box::new(applied),
                    superseded: false,
                });
        }

        let pending = Pending {
            controller: self,
            key,
            address,
            id,
            open: true,
        };
        let result = confirm_remote().await;

        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!(entity = %pending.key, "mutation resolved after logout, ignoring");
            pending.resolve(Resolution::Rejected);
            return Ok(Outcome::Abandoned);
        }
        match result {
            Ok(()) => {
                pending.resolve(Resolution::Confirmed);
                Ok(Outcome::Committed)
            }
            Err(err) => {
                warn!(entity = %pending.key, "remote rejected mutation, rolling back");
                pending.resolve(Resolution::Rejected);
                Err(err)
            }
        }
    }

    /// Retire slot `id` of `address`, restoring the store if it was the
    /// newest slot and failed. Unknown slots (abandoned at logout) are
    /// ignored.
    fn resolve<K>(&self, key: &K, address: &SlotKey, id: u64, resolution: Resolution)
    where
        S: Memento<K>,
    {
        let mut state = self.lock();
        let restore = {
            let mut pending = lock_pending(&self.pending);
            let Some(stack) = pending.get_mut(address) else {
                return;
            };
            let Some(index) = stack.iter().position(|slot| slot.id == id) else {
                return;
            };
            let slot = stack.remove(index);
            let mut restore = None;
            if !slot.superseded {
                match resolution {
                    Resolution::Confirmed => {
                        for older in &mut stack[..index] {
                            older.superseded = true;
                        }
                        if let Some(newer) = stack.get_mut(index) {
                            newer.base = slot.applied;
                        }
                    }
                    Resolution::Rejected => match stack.get_mut(index) {
                        Some(newer) => newer.base = slot.base,
                        None => restore = Some(slot.base),
                    },
                }
            }
            if stack.is_empty() {
                pending.remove(address);
            }
            restore
        };

        if let Some(snapshot) = restore.and_then(|base| base.downcast::<S::Snapshot>().ok()) {
            state.restore(key, *snapshot);
        }
    }
}

fn slot_key<K: Display + 'static>(key: &K) -> SlotKey {
    (TypeId::of::<K>(), key.to_string())
}

fn lock_pending(map: &Mutex<HashMap<SlotKey, Vec<Slot>>>) -> MutexGuard<'_, HashMap<SlotKey, Vec<Slot>>> {
    map.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle on one in-flight mutation. Dropped unresolved, it counts as a
/// rejection.
struct Pending<'a, S: Memento<K>, K: Display> {
    controller: &'a OptimisticController<S>,
    key: K,
    address: SlotKey,
    id: u64,
    open: bool,
}

impl<S: Memento<K>, K: Display> Pending<'_, S, K> {
    fn resolve(mut self, resolution: Resolution) {
        self.open = false;
        self.controller
            .resolve(&self.key, &self.address, self.id, resolution);
    }
}

impl<S: Memento<K>, K: Display> Drop for Pending<'_, S, K> {
    fn drop(&mut self) {
        if self.open {
            warn!(entity = %self.key, "mutation cancelled before confirmation, rolling back");
            self.controller
                .resolve(&self.key, &self.address, self.id, Resolution::Rejected);
        }
    }
}
