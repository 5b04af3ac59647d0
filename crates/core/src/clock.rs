// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Injectable clock: wall time plus clock-driven sleeps.
//!
//! Nothing in the scheduler reads `SystemTime::now()` or sleeps on the
//! runtime directly; everything time-related goes through [`Clock`] so
//! tests can drive the ticker and the intra-tick dispatch timers
//! deterministically with [`FakeClock::advance`].

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::oneshot;

/// Source of wall-clock time and timer sleeps.
#[async_trait]
pub trait Clock: Clone + Send + Sync + 'static {
    /// Current wall-clock time.
    fn now(&self) -> SystemTime;

    /// Sleep for `duration` as measured by this clock.
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by the OS and the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

struct Sleeper {
    deadline: SystemTime,
    tx: oneshot::Sender<()>,
}

struct FakeClockState {
    now: SystemTime,
    sleepers: Vec<Sleeper>,
}

/// Manually-advanced clock for tests. Starts at the Unix epoch.
///
/// Clones share state: advancing through one handle wakes sleepers
/// registered through any other.
#[derive(Clone)]
pub struct FakeClock {
    inner: Arc<Mutex<FakeClockState>>,
}

impl Default for FakeClock {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeClockState {
                now: SystemTime::UNIX_EPOCH,
                sleepers: Vec::new(),
            })),
        }
    }
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward, waking every sleeper whose deadline has passed.
    pub fn advance(&self, duration: Duration) {
        let due: Vec<oneshot::Sender<()>> = {
            let mut state = self.inner.lock();
            state.now += duration;
            let now = state.now;
            let (due, pending): (Vec<_>, Vec<_>) = state
                .sleepers
                .drain(..)
                .partition(|sleeper| sleeper.deadline <= now);
            state.sleepers = pending;
            due.into_iter().map(|sleeper| sleeper.tx).collect()
        };
        for tx in due {
            let _ = tx.send(());
        }
    }

    /// Number of currently registered sleepers.
    pub fn sleeper_count(&self) -> usize {
        self.inner.lock().sleepers.len()
    }

    /// Yield until at least `count` sleepers are registered.
    ///
    /// Lets a test rendezvous with a task that is about to sleep before
    /// advancing past its deadline.
    pub async fn wait_for_sleepers(&self, count: usize) {
        while self.inner.lock().sleepers.len() < count {
            tokio::task::yield_now().await;
        }
    }

    /// Yield until some sleeper is registered with exactly `deadline`.
    pub async fn wait_for_sleeper_until(&self, deadline: SystemTime) {
        loop {
            {
                let state = self.inner.lock();
                if state.sleepers.iter().any(|s| s.deadline == deadline) {
                    return;
                }
            }
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl Clock for FakeClock {
    fn now(&self) -> SystemTime {
        self.inner.lock().now
    }

    async fn sleep(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        let rx = {
            let mut state = self.inner.lock();
            let (tx, rx) = oneshot::channel();
            let deadline = state.now + duration;
            state.sleepers.push(Sleeper { deadline, tx });
            rx
        };
        let _ = rx.await;
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
