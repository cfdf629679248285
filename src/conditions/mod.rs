//! boolean conditions
//!
//! a condition holds a single satisfied/unsatisfied state that any number of
//! threads or tasks can:
//! - wait on: `wait_until` / `get_and_wait_change` hand out one-shot handles
//! - observe: `register` pushes every change to a callback
//! - terminate: `close` releases every pending wait with `ConditionError::Closed`
//!
//! `ManualCondition` is set explicitly. `DelayedCondition` wraps another
//! condition and only republishes changes that persist for a given delay.

mod delay;
mod error;
mod handle;
mod manual;
mod observer;

use std::sync::Arc;

pub use delay::DelayedCondition;
pub use error::ConditionError;
pub use handle::{channel, Notifier, WaitHandle};
pub use manual::ManualCondition;
pub use observer::{ConditionObserver, Subscription};

/// a boolean state that can be waited on and observed
pub trait Condition: Send + Sync {
    /// current state
    fn satisfied(&self) -> bool;

    /// returns a handle that resolves once the condition reaches `satisfied`
    ///
    /// if the condition already has that state the handle is resolved on
    /// return. if the condition is closed first, the handle resolves with
    /// `ConditionError::Closed`.
    fn wait_until(&self, satisfied: bool) -> WaitHandle;

    /// returns the current state together with a handle that resolves on
    /// the next change of state
    fn get_and_wait_change(&self) -> (bool, WaitHandle);

    /// register an observer
    ///
    /// the observer is called with the current state before returning and
    /// then with every new state until the subscription is cancelled.
    fn register(&self, observer: Arc<dyn ConditionObserver>) -> Subscription;

    /// terminate the condition
    ///
    /// pending waits are unblocked with `ConditionError::Closed`. calling
    /// this twice or more has no effect.
    fn close(&self) -> Result<(), ConditionError>;
}

/// a type whose state can be set
pub trait Settable {
    /// set the satisfied state to the specified value
    fn set(&self, satisfied: bool);
}

impl<C: Condition + ?Sized> Condition for Arc<C> {
    fn satisfied(&self) -> bool {
        (**self).satisfied()
    }

    fn wait_until(&self, satisfied: bool) -> WaitHandle {
        (**self).wait_until(satisfied)
    }

    fn get_and_wait_change(&self) -> (bool, WaitHandle) {
        (**self).get_and_wait_change()
    }

    fn register(&self, observer: Arc<dyn ConditionObserver>) -> Subscription {
        (**self).register(observer)
    }

    fn close(&self) -> Result<(), ConditionError> {
        (**self).close()
    }
}

impl<C: Condition + ?Sized> Condition for Box<C> {
    fn satisfied(&self) -> bool {
        (**self).satisfied()
    }

    fn wait_until(&self, satisfied: bool) -> WaitHandle {
        (**self).wait_until(satisfied)
    }

    fn get_and_wait_change(&self) -> (bool, WaitHandle) {
        (**self).get_and_wait_change()
    }

    fn register(&self, observer: Arc<dyn ConditionObserver>) -> Subscription {
        (**self).register(observer)
    }

    fn close(&self) -> Result<(), ConditionError> {
        (**self).close()
    }
}
