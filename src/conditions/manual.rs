//! explicitly settable condition

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::error::ConditionError;
use super::handle::{self, Notifier, WaitHandle};
use super::observer::{ConditionObserver, Subscription};
use super::{Condition, Settable};

struct State {
    satisfied: bool,
    /// one notifier per outstanding wait, consumed on the next change
    pending: Vec<Notifier>,
    /// registered observers, in registration order
    observers: Vec<(u64, Arc<dyn ConditionObserver>)>,
    closed: bool,
}

struct Shared {
    next_id: AtomicU64,
    state: Mutex<State>,
}

/// a condition that is set or unset explicitly
///
/// clones share the same underlying state.
#[derive(Clone)]
pub struct ManualCondition {
    shared: Arc<Shared>,
}

impl ManualCondition {
    /// create a condition in the given initial state
    pub fn new(satisfied: bool) -> Self {
        Self {
            shared: Arc::new(Shared {
                next_id: AtomicU64::new(1),
                state: Mutex::new(State {
                    satisfied,
                    pending: Vec::new(),
                    observers: Vec::new(),
                    closed: false,
                }),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// check if `close` was called
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// number of waits still pending
    pub fn pending_count(&self) -> usize {
        self.lock()
            .pending
            .iter()
            .filter(|n| !n.is_abandoned())
            .count()
    }

    /// number of registered observers
    pub fn observer_count(&self) -> usize {
        self.lock().observers.len()
    }

    fn add_pending(state: &mut State) -> WaitHandle {
        // drop notifiers whose handle was thrown away before any change
        state.pending.retain(|n| !n.is_abandoned());

        let (notifier, handle) = handle::channel();
        state.pending.push(notifier);
        handle
    }
}

impl Default for ManualCondition {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Condition for ManualCondition {
    fn satisfied(&self) -> bool {
        self.lock().satisfied
    }

    /// wait until the condition reaches `satisfied`
    ///
    /// if it already has that state, the handle is resolved immediately.
    fn wait_until(&self, satisfied: bool) -> WaitHandle {
        let mut state = self.lock();

        if state.satisfied == satisfied {
            return WaitHandle::resolved();
        }
        if state.closed {
            return WaitHandle::closed();
        }

        Self::add_pending(&mut state)
    }

    fn get_and_wait_change(&self) -> (bool, WaitHandle) {
        let mut state = self.lock();

        if state.closed {
            return (state.satisfied, WaitHandle::closed());
        }

        let handle = Self::add_pending(&mut state);
        (state.satisfied, handle)
    }

    /// register an observer for changes
    ///
    /// the observer is called with the current state before this returns,
    /// then on every change until the subscription is cancelled.
    fn register(&self, observer: Arc<dyn ConditionObserver>) -> Subscription {
        let mut state = self.lock();

        observer.on_change(state.satisfied);

        if state.closed {
            return Subscription::inert();
        }

        let id = self.shared.next_id.fetch_add(1, Ordering::SeqCst);
        state.observers.push((id, observer));
        tracing::trace!(id, observers = state.observers.len(), "observer registered");

        let shared = Arc::downgrade(&self.shared);
        Subscription::new(move || {
            let Some(shared) = shared.upgrade() else {
                return;
            };
            let mut state = shared
                .state
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            state.observers.retain(|(observer_id, _)| *observer_id != id);
        })
    }

    /// close the condition
    ///
    /// every pending wait resolves with `ConditionError::Closed` and all
    /// observers are dropped. calling this twice or more has no effect.
    fn close(&self) -> Result<(), ConditionError> {
        let mut state = self.lock();

        if state.closed {
            return Ok(());
        }
        state.closed = true;

        let pending = std::mem::take(&mut state.pending);
        tracing::debug!(
            pending = pending.len(),
            observers = state.observers.len(),
            "closing condition"
        );
        for notifier in pending {
            notifier.close();
        }
        state.observers.clear();

        Ok(())
    }
}

impl Settable for ManualCondition {
    /// set the state explicitly
    ///
    /// setting the current state again is a no-op and does not resolve any
    /// pending wait.
    fn set(&self, satisfied: bool) {
        let mut state = self.lock();

        if state.closed {
            tracing::debug!(satisfied, "ignoring set on closed condition");
            return;
        }
        if state.satisfied == satisfied {
            return;
        }

        state.satisfied = satisfied;
        tracing::trace!(
            satisfied,
            pending = state.pending.len(),
            observers = state.observers.len(),
            "condition changed"
        );

        for notifier in std::mem::take(&mut state.pending) {
            notifier.notify();
        }
        for (_, observer) in &state.observers {
            observer.on_change(satisfied);
        }
    }
}

impl fmt::Debug for ManualCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("ManualCondition")
            .field("satisfied", &state.satisfied)
            .field("pending", &state.pending.len())
            .field("observers", &state.observers.len())
            .field("closed", &state.closed)
            .finish()
    }
}
