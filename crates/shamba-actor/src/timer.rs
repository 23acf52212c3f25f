//! # Owned Tasks & Timers
//!
//! Machines never start ambient timers. Every piece of background work they start is held
//! as a [`TaskHandle`], which aborts the task when dropped, so clearing a field is enough
//! to cancel a timer or an outstanding request.
//!
//! Anything a child task posts back is tagged with the [`Generation`] it was started under.
//! When a machine restarts or cancels it advances its generation; events from older
//! generations still sitting in the queue are then recognised as stale and dropped.

use crate::message::Outbox;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::warn;

/// Handle to a spawned child task. Dropping it aborts the task.
#[derive(Debug)]
pub struct TaskHandle {
    handle: JoinHandle<()>,
}

impl TaskHandle {
    /// Spawns `future` on the current runtime.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(future),
        }
    }

    /// Returns `true` once the task has run to completion or been aborted.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Shortest period [`every`] will tick at.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Posts `make_event()` to `outbox` every `period`, starting one full period from now.
///
/// A zero `period` is raised to [`MIN_PERIOD`]. The ticker stops when the handle is dropped
/// or when the owning actor shuts down.
pub fn every<E, F>(period: Duration, outbox: Outbox<E>, mut make_event: F) -> TaskHandle
where
    E: Send + 'static,
    F: FnMut() -> E + Send + 'static,
{
    if period.is_zero() {
        warn!("Zero timer period, using {:?}", MIN_PERIOD);
    }
    let period = period.max(MIN_PERIOD);
    TaskHandle::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if !outbox.post(make_event()) {
                break;
            }
        }
    })
}

/// Posts `event` to `outbox` once, after `delay`.
pub fn after<E>(delay: Duration, outbox: Outbox<E>, event: E) -> TaskHandle
where
    E: Send + 'static,
{
    TaskHandle::spawn(async move {
        tokio::time::sleep(delay).await;
        outbox.post(event);
    })
}

/// Monotonic counter identifying one run of a machine's background work.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    /// Moves to the next generation and returns it. Everything tagged with an earlier
    /// value is stale from now on.
    pub fn advance(&mut self) -> Generation {
        self.0 += 1;
        *self
    }

    /// Whether `tag` belongs to the current generation.
    pub fn is_current(&self, tag: Generation) -> bool {
        self.0 == tag.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen_{}", self.0)
    }
}
