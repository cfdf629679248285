//! triggers: named side effects driven by a condition's state
//!
//! a trigger is invoked with an output sink, its name and the current state.
//! [`TriggerObserver`] adapts a trigger to the observer contract so it can be
//! registered on any condition; deciding which trigger goes on which
//! condition is left to the caller.

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

use crate::conditions::{Condition, ConditionObserver, Subscription};

/// error returned by a trigger run
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("failed to write trigger output: {0}")]
    Io(#[from] io::Error),
    #[error("trigger failed: {0}")]
    Failed(String),
}

impl TriggerError {
    pub fn failed(message: impl Into<String>) -> Self {
        TriggerError::Failed(message.into())
    }
}

/// a named unit of work run with a boolean state
pub trait Trigger: Send + Sync {
    fn run(&self, out: &mut dyn Write, name: &str, state: bool) -> Result<(), TriggerError>;
}

/// trigger backed by a function, see [`trigger_fn`]
pub struct TriggerFn<F> {
    f: F,
}

/// create a trigger from a function
pub fn trigger_fn<F>(f: F) -> TriggerFn<F>
where
    F: Fn(&mut dyn Write, &str, bool) -> Result<(), TriggerError> + Send + Sync,
{
    TriggerFn { f }
}

impl<F> Trigger for TriggerFn<F>
where
    F: Fn(&mut dyn Write, &str, bool) -> Result<(), TriggerError> + Send + Sync,
{
    fn run(&self, out: &mut dyn Write, name: &str, state: bool) -> Result<(), TriggerError> {
        (self.f)(out, name, state)
    }
}

/// output sink shared by every trigger run
pub type SharedSink = Arc<Mutex<dyn Write + Send>>;

/// runs a trigger every time the observed condition reports a state
///
/// failures are logged and counted, never propagated to the condition.
pub struct TriggerObserver {
    name: String,
    trigger: Arc<dyn Trigger>,
    sink: SharedSink,
    runs: AtomicU64,
    failures: AtomicU64,
}

impl TriggerObserver {
    pub fn new(name: impl Into<String>, trigger: Arc<dyn Trigger>, sink: SharedSink) -> Self {
        Self {
            name: name.into(),
            trigger,
            sink,
            runs: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// number of times the trigger ran
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::SeqCst)
    }

    /// number of runs that returned an error
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::SeqCst)
    }
}

impl ConditionObserver for TriggerObserver {
    fn on_change(&self, satisfied: bool) {
        self.runs.fetch_add(1, Ordering::SeqCst);

        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        let result = self
            .trigger
            .run(&mut *sink, &self.name, satisfied)
            .and_then(|()| sink.flush().map_err(TriggerError::from));

        if let Err(e) = result {
            self.failures.fetch_add(1, Ordering::SeqCst);
            tracing::warn!(trigger = %self.name, satisfied, error = %e, "trigger failed");
        }
    }
}

impl fmt::Debug for TriggerObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerObserver")
            .field("name", &self.name)
            .field("runs", &self.runs())
            .field("failures", &self.failures())
            .finish()
    }
}

/// register `trigger` on `condition` under `name`
///
/// the trigger runs right away with the current state, then on every change.
pub fn bind(
    condition: &dyn Condition,
    name: impl Into<String>,
    trigger: Arc<dyn Trigger>,
    sink: SharedSink,
) -> (Arc<TriggerObserver>, Subscription) {
    let observer = Arc::new(TriggerObserver::new(name, trigger, sink));
    let subscription = condition.register(observer.clone());
    (observer, subscription)
}
