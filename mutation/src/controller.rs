//! The optimistic mutation controller.
//!
//! One controller owns the displayed values for one collection. Mutations
//! update the display synchronously and persist in the background; every
//! key tracks its own rollback value, in-flight request, and failure, so
//! concurrent mutations on different keys never interfere.
//!
//! Per-key lifecycle: `Idle -> Pending -> {Committed, RolledBack} -> Idle`.
//! A second mutation on a key that is still `Pending` cancels the first
//! request and keeps the original rollback value, so an eventual rollback
//! restores the last committed state, never an intermediate optimistic
//! value.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;

use nasara_async_utils::OrCancel;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::warn;

use crate::error::PersistFailure;

/// Rollback record for a key with an outstanding persistence request.
///
/// `previous` is captured when the key leaves `Idle` and survives
/// supersession; `generation` identifies the newest request, the only one
/// allowed to settle the key.
struct InFlight<V> {
    previous: V,
    generation: u64,
    token: CancellationToken,
}

/// Pending quiet-window timer for a debounced mutation chain.
struct DebounceSlot<V> {
    id: u64,
    token: CancellationToken,
    /// Rollback target captured when the chain started.
    chain_previous: V,
}

struct ControllerState<K, V> {
    values: HashMap<K, V>,
    in_flight: HashMap<K, InFlight<V>>,
    debounce: HashMap<K, DebounceSlot<V>>,
    failures: HashMap<K, PersistFailure>,
    next_request_id: u64,
}

impl<K, V> ControllerState<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Default,
{
    fn new() -> Self {
        Self {
            values: HashMap::new(),
            in_flight: HashMap::new(),
            debounce: HashMap::new(),
            failures: HashMap::new(),
            next_request_id: 0,
        }
    }

    /// Transition a key into `Pending`: record the rollback value, cancel
    /// any superseded request or timer, apply the optimistic value, and
    /// hand back the identity of the new request.
    fn arm(&mut self, key: &K, new_value: V, chain_previous: Option<V>) -> (u64, CancellationToken) {
        if let Some(slot) = self.debounce.remove(key) {
            slot.token.cancel();
        }
        // Starting a new attempt clears the key's sticky failure.
        self.failures.remove(key);
        self.next_request_id += 1;
        let generation = self.next_request_id;
        let token = CancellationToken::new();
        match self.in_flight.get_mut(key) {
            Some(entry) => {
                // Supersede: the old request must not settle this key, but
                // the rollback value from before the chain is kept.
                entry.token.cancel();
                entry.token = token.clone();
                entry.generation = generation;
            }
            None => {
                let previous = chain_previous
                    .unwrap_or_else(|| self.values.get(key).cloned().unwrap_or_default());
                self.in_flight.insert(
                    key.clone(),
                    InFlight {
                        previous,
                        generation,
                        token: token.clone(),
                    },
                );
            }
        }
        self.values.insert(key.clone(), new_value);
        (generation, token)
    }
}

/// Coordinates local-first updates against asynchronous persistence.
///
/// Handles are cheap to clone and share one state. All synchronous
/// operations are race-free with respect to each other; the only
/// suspension points are the persistence calls themselves. Mutation
/// methods must be called from within a tokio runtime.
pub struct MutationController<K, V> {
    state: Arc<Mutex<ControllerState<K, V>>>,
}

impl<K, V> Clone for MutationController<K, V> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<K, V> Default for MutationController<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + 'static,
    V: Clone + Default + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> MutationController<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + 'static,
    V: Clone + Default + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ControllerState::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState<K, V>> {
        lock_state(&self.state)
    }

    /// Replace the entire value map, e.g. from an initial collection load.
    pub fn seed(&self, values: HashMap<K, V>) {
        self.lock().values = values;
    }

    /// The current optimistic value for `key` (committed or pending);
    /// absent keys read as the default.
    pub fn display_value(&self, key: &K) -> V {
        self.lock().values.get(key).cloned().unwrap_or_default()
    }

    /// Snapshot of all current display values, for aggregation.
    pub fn values_snapshot(&self) -> HashMap<K, V> {
        self.lock().values.clone()
    }

    /// Whether `key` has an unsettled mutation. Derived from the rollback
    /// table; there is no separately maintained flag to fall out of sync.
    pub fn is_saving(&self, key: &K) -> bool {
        self.lock().in_flight.contains_key(key)
    }

    /// Whether any key has an unsettled mutation.
    pub fn is_saving_any(&self) -> bool {
        !self.lock().in_flight.is_empty()
    }

    /// The sticky failure for `key`, if its last attempt rolled back.
    pub fn failure(&self, key: &K) -> Option<PersistFailure> {
        self.lock().failures.get(key).cloned()
    }

    pub fn dismiss_failure(&self, key: &K) {
        self.lock().failures.remove(key);
    }

    /// Apply `new_value` to the display immediately and persist it in the
    /// background. Fire-and-forget: the outcome surfaces through
    /// [`Self::is_saving`] and [`Self::failure`].
    ///
    /// Any outstanding request or pending debounce timer for `key` is
    /// cancelled first; a cancelled request can no longer settle the key.
    pub fn begin_mutation<F, Fut>(&self, key: K, new_value: V, persist: F)
    where
        F: FnOnce(K, V) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), PersistFailure>> + Send + 'static,
    {
        let (generation, token) = self.lock().arm(&key, new_value.clone(), None);
        self.spawn_persist(key, new_value, generation, token, persist);
    }

    /// Debounced variant for free-text fields: the display updates on
    /// every call, but persistence fires only for the last value supplied
    /// within a `quiet` window. The rollback target is the value from
    /// before the first call of the chain.
    pub fn schedule_mutation<F, Fut>(&self, key: K, new_value: V, persist: F, quiet: Duration)
    where
        F: FnOnce(K, V) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), PersistFailure>> + Send + 'static,
    {
        let token = CancellationToken::new();
        let slot_id = {
            let mut state = self.lock();
            // Reset the quiet window, carrying the chain's rollback target
            // forward so later keystrokes never become rollback values.
            let chain_previous = match state.debounce.remove(&key) {
                Some(slot) => {
                    slot.token.cancel();
                    slot.chain_previous
                }
                None => match state.in_flight.get(&key) {
                    Some(entry) => entry.previous.clone(),
                    None => state.values.get(&key).cloned().unwrap_or_default(),
                },
            };
            state.next_request_id += 1;
            let slot_id = state.next_request_id;
            state.debounce.insert(
                key.clone(),
                DebounceSlot {
                    id: slot_id,
                    token: token.clone(),
                    chain_previous,
                },
            );
            // Typing is reflected unconditionally; only persistence waits.
            state.values.insert(key.clone(), new_value);
            slot_id
        };

        let weak = Arc::downgrade(&self.state);
        tokio::spawn(async move {
            if tokio::time::sleep(quiet).or_cancel(&token).await.is_err() {
                // Superseded by a newer call for this key, or torn down.
                return;
            }
            let Some(state) = weak.upgrade() else {
                return;
            };
            let controller = MutationController { state };
            let armed = {
                let mut state = controller.lock();
                // Only the slot that armed this timer may fire it.
                let ours = state.debounce.get(&key).is_some_and(|slot| slot.id == slot_id);
                if ours {
                    let chain_previous = state.debounce.remove(&key).map(|s| s.chain_previous);
                    let latest = state.values.get(&key).cloned().unwrap_or_default();
                    Some((state.arm(&key, latest.clone(), chain_previous), latest))
                } else {
                    None
                }
            };
            if let Some(((generation, token), latest)) = armed {
                controller.spawn_persist(key, latest, generation, token, persist);
            }
        });
    }

    /// Cancel every outstanding request and debounce timer. Settlements
    /// arriving after teardown have no effect on state.
    pub fn shutdown(&self) {
        let mut state = self.lock();
        for entry in state.in_flight.values() {
            entry.token.cancel();
        }
        for slot in state.debounce.values() {
            slot.token.cancel();
        }
        state.in_flight.clear();
        state.debounce.clear();
    }

    fn spawn_persist<F, Fut>(
        &self,
        key: K,
        new_value: V,
        generation: u64,
        token: CancellationToken,
        persist: F,
    ) where
        F: FnOnce(K, V) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), PersistFailure>> + Send + 'static,
    {
        // The task holds a weak reference: a torn-down session must not be
        // revived or mutated by a late settlement.
        let weak = Arc::downgrade(&self.state);
        tokio::spawn(async move {
            let outcome = persist(key.clone(), new_value).or_cancel(&token).await;
            let Ok(result) = outcome else {
                // Cancelled: neither success nor failure. A newer request
                // owns the key now (or the session is gone).
                return;
            };
            let Some(state) = weak.upgrade() else {
                return;
            };
            let mut state = lock_state(&state);
            if state.in_flight.get(&key).map(|e| e.generation) != Some(generation) {
                // A newer mutation for this key was issued while we were
                // settling; its outcome is the only one that counts.
                return;
            }
            match result {
                Ok(()) => {
                    state.in_flight.remove(&key);
                    debug!(?key, "mutation committed");
                }
                Err(failure) => {
                    if let Some(entry) = state.in_flight.remove(&key) {
                        state.values.insert(key.clone(), entry.previous);
                    }
                    warn!(?key, %failure, "mutation failed, rolled back");
                    state.failures.insert(key, failure);
                }
            }
        });
    }
}

fn lock_state<K, V>(state: &Arc<Mutex<ControllerState<K, V>>>) -> MutexGuard<'_, ControllerState<K, V>> {
    // A panic while holding the lock leaves consistent-enough state to
    // keep rendering; don't compound it.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
