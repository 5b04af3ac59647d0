// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock-aligned heartbeat for the scheduler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tocsin_core::Clock;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Emits one tick per `interval` on a capacity-1 channel, aligned to
/// wall-clock multiples of the interval.
///
/// While paused the boundaries keep passing but nothing is emitted, and
/// there is no backfill on unpause; the next tick arrives at the next
/// natural boundary. Pausing and unpausing are idempotent. A slow consumer
/// delays subsequent ticks rather than dropping them.
pub struct Ticker<C> {
    clock: C,
    interval: Duration,
    paused: Arc<AtomicBool>,
}

impl<C: Clock> Ticker<C> {
    pub fn new(clock: C, interval: Duration) -> Self {
        Self {
            clock,
            interval,
            paused: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stop emitting ticks. Idempotent.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Resume emitting at the next natural boundary. Idempotent.
    pub fn unpause(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    /// Spawn the heartbeat task. Ticks arrive on the returned channel
    /// until `cancel` fires or the receiver is dropped.
    pub fn start(&self, cancel: CancellationToken) -> mpsc::Receiver<SystemTime> {
        let (tx, rx) = mpsc::channel(1);
        let clock = self.clock.clone();
        let interval = self.interval;
        let paused = Arc::clone(&self.paused);
        tokio::spawn(run(clock, interval, paused, tx, cancel));
        rx
    }
}

/// Delay from `now` to the next wall-clock multiple of `interval`.
///
/// Landing exactly on a boundary yields a full interval, so a tick emitted
/// at a boundary never double-fires.
fn next_boundary(now: SystemTime, interval: Duration) -> Duration {
    let since_epoch = now.duration_since(UNIX_EPOCH).unwrap_or_default();
    let interval_nanos = interval.as_nanos().max(1);
    let rem = since_epoch.as_nanos() % interval_nanos;
    if rem == 0 {
        interval
    } else {
        Duration::from_nanos((interval_nanos - rem) as u64)
    }
}

async fn run<C: Clock>(
    clock: C,
    interval: Duration,
    paused: Arc<AtomicBool>,
    tx: mpsc::Sender<SystemTime>,
    cancel: CancellationToken,
) {
    loop {
        let delay = next_boundary(clock.now(), interval);
        tokio::select! {
            _ = clock.sleep(delay) => {}
            _ = cancel.cancelled() => return,
        }
        if paused.load(Ordering::SeqCst) {
            continue;
        }
        let now = clock.now();
        tokio::select! {
            sent = tx.send(now) => {
                if sent.is_err() {
                    debug!("tick receiver dropped, stopping heartbeat");
                    return;
                }
            }
            _ = cancel.cancelled() => return,
        }
    }
}

#[cfg(test)]
#[path = "ticker_tests.rs"]
mod tests;
