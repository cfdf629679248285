// integration tests for the condition primitives through the public API

use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use conditional::conditions::{
    Condition, ConditionError, DelayedCondition, ManualCondition, Settable,
};
use conditional::triggers::{self, trigger_fn, SharedSink, Trigger};

use crate::common::*;

#[test]
fn test_waiter_released_by_set() {
    let condition = ManualCondition::new(false);
    let handle = condition.wait_until(true);

    let waiter = thread::spawn(move || handle.wait_blocking());
    thread::sleep(Duration::from_millis(20));
    condition.set(true);

    assert_eq!(waiter.join().unwrap(), Ok(()));

    // already-satisfied fast path
    let mut again = condition.wait_until(true);
    assert_eq!(again.try_resolved(), Some(Ok(())));
}

#[test]
fn test_many_waiters_released_together() {
    let condition = ManualCondition::new(false);
    let waiters: Vec<_> = (0..8)
        .map(|_| {
            let handle = condition.wait_until(true);
            thread::spawn(move || handle.wait_blocking())
        })
        .collect();

    condition.set(true);

    for waiter in waiters {
        assert_eq!(waiter.join().unwrap(), Ok(()));
    }
}

#[test]
fn test_close_wakes_only_pending_waits_once() {
    let condition = ManualCondition::new(false);
    let pending = condition.wait_until(true);
    let waiter = thread::spawn(move || pending.wait_blocking());

    condition.close().unwrap();
    condition.close().unwrap();

    assert_eq!(waiter.join().unwrap(), Err(ConditionError::Closed));
    assert!(condition.wait_until(false).wait_blocking().is_ok());
}

#[test]
fn test_no_spurious_wakeup_on_same_value() {
    let condition = ManualCondition::new(true);
    let (state, mut handle) = condition.get_and_wait_change();
    assert!(state);

    for _ in 0..5 {
        condition.set(true);
    }
    assert_eq!(handle.try_resolved(), None);
}

#[test]
fn test_concurrent_setters_serialize_observer_calls() {
    let condition = ManualCondition::new(false);
    let (seen, _subscription) = record(&condition);

    let setters: Vec<_> = (0..4)
        .map(|i| {
            let condition = condition.clone();
            thread::spawn(move || {
                for j in 0..100 {
                    condition.set((i + j) % 2 == 0);
                }
            })
        })
        .collect();
    for setter in setters {
        setter.join().unwrap();
    }

    // every delivery is a real change from the previous one
    let seen = seen.lock().unwrap();
    for pair in seen.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
    assert_eq!(*seen.last().unwrap(), condition.satisfied());
}

#[tokio::test(start_paused = true)]
async fn test_delayed_trigger_sees_only_lasting_states() {
    let source = ManualCondition::new(false);
    let delayed = DelayedCondition::new(source.clone(), Duration::from_millis(100));

    let buffer = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink: SharedSink = buffer.clone();
    let trigger: Arc<dyn Trigger> = Arc::new(trigger_fn(|out, name, state| {
        writeln!(out, "{} {}", name, state)?;
        Ok(())
    }));
    let (observer, _subscription) = triggers::bind(&delayed, "alarm", trigger, sink);

    // flicker
    source.set(true);
    tokio::time::sleep(Duration::from_millis(40)).await;
    source.set(false);
    tokio::time::sleep(Duration::from_millis(200)).await;

    // lasting change
    source.set(true);
    tokio::time::sleep(Duration::from_millis(150)).await;

    let written = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    assert_eq!(written, "alarm false\nalarm true\n");
    assert_eq!(observer.runs(), 2);

    delayed.close().unwrap();
    assert!(source.is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_delayed_over_shared_source() {
    let source = ManualCondition::new(true);
    let shared: Arc<dyn Condition> = Arc::new(source.clone());
    let delayed = DelayedCondition::new(shared.clone(), Duration::from_millis(10));

    assert!(delayed.satisfied());

    source.set(false);
    assert_eq!(delayed.wait_until(false).await, Ok(()));

    delayed.close().unwrap();
    assert_eq!(shared.wait_until(true).await, Err(ConditionError::Closed));
}
