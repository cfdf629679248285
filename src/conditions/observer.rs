//! push-based observers and their cancel tokens

use std::fmt;
use std::sync::{Mutex, PoisonError};

/// receives the state of a condition on registration and on every change
///
/// observers run inside the condition's critical section: they must not
/// call back into the same condition (set, register, close) or they will
/// deadlock.
pub trait ConditionObserver: Send + Sync {
    fn on_change(&self, satisfied: bool);
}

impl<F> ConditionObserver for F
where
    F: Fn(bool) + Send + Sync,
{
    fn on_change(&self, satisfied: bool) {
        self(satisfied)
    }
}

type CancelFn = Box<dyn FnOnce() + Send>;

/// handle for a registered observer
///
/// dropping a subscription does NOT unregister the observer; call
/// [`Subscription::cancel`] for that.
pub struct Subscription {
    cancel: Mutex<Option<CancelFn>>,
}

impl Subscription {
    /// build a subscription from the function that removes the observer
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Mutex::new(Some(Box::new(cancel))),
        }
    }

    /// a subscription with nothing to cancel
    pub fn inert() -> Self {
        Self {
            cancel: Mutex::new(None),
        }
    }

    /// remove the observer from its condition
    ///
    /// calling this more than once has no effect.
    pub fn cancel(&self) {
        let cancel = self
            .cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }

    /// check if `cancel` has been called (or there was nothing to cancel)
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
