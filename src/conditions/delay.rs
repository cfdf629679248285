//! debounced condition
//!
//! `DelayedCondition` republishes the state of a source condition only once
//! that state has held for at least `delay`:
//!
//! ```text
//!            source change                    delay elapsed
//!   Idle ─────────────────► Pending ─────────────────────────► Idle
//!                            │   ▲            (publish last state)
//!                            └───┘
//!                        source change
//!                      (restart the window)
//! ```
//!
//! the initial state of the source is copied without delay. closing the
//! delayed condition (or the source) moves the loop to its terminal state.

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::Sleep;
use tokio_util::sync::CancellationToken;

use super::error::ConditionError;
use super::handle::WaitHandle;
use super::manual::ManualCondition;
use super::observer::{ConditionObserver, Subscription};
use super::{Condition, Settable};

/// a condition whose changes are reflected only if they last at least `delay`
pub struct DelayedCondition {
    published: ManualCondition,
    subcondition: Arc<dyn Condition>,
    delay: Duration,
    done: CancellationToken,
}

impl DelayedCondition {
    /// wrap `condition`, running the debounce loop on the current tokio runtime
    ///
    /// # Panics
    ///
    /// panics if called outside of a tokio runtime, like `tokio::spawn`.
    pub fn new<C: Condition + 'static>(condition: C, delay: Duration) -> Self {
        Self::spawn_on(condition, delay, &Handle::current())
    }

    /// wrap `condition`, running the debounce loop on `runtime`
    pub fn spawn_on<C: Condition + 'static>(
        condition: C,
        delay: Duration,
        runtime: &Handle,
    ) -> Self {
        let subcondition: Arc<dyn Condition> = Arc::new(condition);
        let (state, change) = subcondition.get_and_wait_change();

        let published = ManualCondition::new(state);
        let done = CancellationToken::new();

        let debounce = Debounce {
            published: published.clone(),
            subcondition: subcondition.clone(),
            delay,
            done: done.clone(),
        };
        runtime.spawn(debounce.run(state, change));

        tracing::debug!(delay_ms = delay.as_millis() as u64, state, "delayed condition created");

        Self {
            published,
            subcondition,
            delay,
            done,
        }
    }

    /// minimum time a source state must hold before it is published
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// check if the condition was closed, directly or through its source
    pub fn is_closed(&self) -> bool {
        self.published.is_closed()
    }
}

impl Condition for DelayedCondition {
    fn satisfied(&self) -> bool {
        self.published.satisfied()
    }

    fn wait_until(&self, satisfied: bool) -> WaitHandle {
        self.published.wait_until(satisfied)
    }

    fn get_and_wait_change(&self) -> (bool, WaitHandle) {
        self.published.get_and_wait_change()
    }

    fn register(&self, observer: Arc<dyn ConditionObserver>) -> Subscription {
        self.published.register(observer)
    }

    /// stop the debounce loop, then close the source and the published state
    ///
    /// calling this twice or more has no effect.
    fn close(&self) -> Result<(), ConditionError> {
        self.done.cancel();
        let source = self.subcondition.close();
        let published = self.published.close();
        source.and(published)
    }
}

impl Drop for DelayedCondition {
    fn drop(&mut self) {
        // the loop must not outlive its condition
        self.done.cancel();
    }
}

impl fmt::Debug for DelayedCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelayedCondition")
            .field("published", &self.published)
            .field("delay", &self.delay)
            .finish()
    }
}

/// state owned by the background loop
struct Debounce {
    published: ManualCondition,
    subcondition: Arc<dyn Condition>,
    delay: Duration,
    done: CancellationToken,
}

impl Debounce {
    async fn run(self, mut state: bool, mut change: WaitHandle) {
        // None = Idle (nothing awaiting confirmation)
        let mut timer: Option<Pin<Box<Sleep>>> = None;

        loop {
            tokio::select! {
                biased;

                _ = self.done.cancelled() => {
                    tracing::trace!("debounce loop stopped");
                    return;
                }

                outcome = &mut change => {
                    if let Err(ConditionError::Closed) = outcome {
                        // the source is gone: nothing will ever be confirmed again
                        tracing::debug!("source condition closed, closing delayed condition");
                        let _ = self.published.close();
                        return;
                    }

                    (state, change) = self.subcondition.get_and_wait_change();
                    timer = Some(Box::pin(tokio::time::sleep(self.delay)));
                    tracing::trace!(state, "source changed, debounce window restarted");
                }

                _ = async {
                    match timer.as_mut() {
                        Some(sleep) => sleep.await,
                        None => std::future::pending().await,
                    }
                } => {
                    tracing::trace!(state, "debounce window elapsed");
                    self.published.set(state);
                    timer = None;
                }
            }
        }
    }
}
