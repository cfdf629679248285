//! one-shot wait handles
//!
//! every wait on a condition hands out its own `WaitHandle`. the handle
//! resolves exactly once: `Ok(())` when the awaited change happened, or
//! `Err(ConditionError::Closed)` when the condition shut down first.
//!
//! a handle can be awaited from async code, or resolved from a plain thread
//! with [`WaitHandle::wait_blocking`].

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::oneshot;

use super::error::ConditionError;

type Outcome = Result<(), ConditionError>;

/// create a pending handle together with the notifier that resolves it
pub fn channel() -> (Notifier, WaitHandle) {
    let (sender, receiver) = oneshot::channel();
    (
        Notifier { sender },
        WaitHandle {
            state: State::Pending(receiver),
        },
    )
}

/// resolving side of a pending `WaitHandle`
#[derive(Debug)]
pub struct Notifier {
    sender: oneshot::Sender<Outcome>,
}

impl Notifier {
    /// wake the waiter normally
    pub fn notify(self) {
        // receiver gone = nobody is waiting anymore
        let _ = self.sender.send(Ok(()));
    }

    /// wake the waiter with `ConditionError::Closed`
    pub fn close(self) {
        let _ = self.sender.send(Err(ConditionError::Closed));
    }

    /// check if the waiting side dropped its handle
    pub fn is_abandoned(&self) -> bool {
        self.sender.is_closed()
    }
}

#[derive(Debug)]
enum State {
    Ready(Outcome),
    Pending(oneshot::Receiver<Outcome>),
}

/// a single outstanding wait on a condition
#[derive(Debug)]
#[must_use = "a wait handle does nothing unless awaited or polled"]
pub struct WaitHandle {
    state: State,
}

impl WaitHandle {
    /// a handle that is already resolved without error
    pub fn resolved() -> Self {
        Self {
            state: State::Ready(Ok(())),
        }
    }

    /// a handle that is already resolved with `ConditionError::Closed`
    pub fn closed() -> Self {
        Self {
            state: State::Ready(Err(ConditionError::Closed)),
        }
    }

    /// poll the handle without blocking
    ///
    /// returns `None` while the wait is still pending.
    pub fn try_resolved(&mut self) -> Option<Outcome> {
        let outcome = match &mut self.state {
            State::Ready(outcome) => return Some(*outcome),
            State::Pending(receiver) => match receiver.try_recv() {
                Ok(outcome) => outcome,
                Err(oneshot::error::TryRecvError::Empty) => return None,
                Err(oneshot::error::TryRecvError::Closed) => Err(ConditionError::Closed),
            },
        };
        self.state = State::Ready(outcome);
        Some(outcome)
    }

    /// block the current thread until the handle resolves
    ///
    /// must not be called from within an async context; await the handle
    /// there instead.
    pub fn wait_blocking(self) -> Outcome {
        match self.state {
            State::Ready(outcome) => outcome,
            State::Pending(receiver) => receiver
                .blocking_recv()
                .unwrap_or(Err(ConditionError::Closed)),
        }
    }

    /// await the handle for at most `timeout`
    ///
    /// returns `None` if the handle did not resolve in time.
    pub async fn wait_timeout(self, timeout: Duration) -> Option<Outcome> {
        tokio::time::timeout(timeout, self).await.ok()
    }
}

impl Future for WaitHandle {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        let outcome = match &mut this.state {
            State::Ready(outcome) => return Poll::Ready(*outcome),
            State::Pending(receiver) => match Pin::new(receiver).poll(cx) {
                Poll::Pending => return Poll::Pending,
                // the notifier was dropped without resolving: its condition is gone
                Poll::Ready(received) => received.unwrap_or(Err(ConditionError::Closed)),
            },
        };
        this.state = State::Ready(outcome);
        Poll::Ready(outcome)
    }
}
