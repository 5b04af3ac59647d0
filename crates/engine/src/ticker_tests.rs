// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the heartbeat ticker.

use super::*;
use tocsin_core::FakeClock;

const INTERVAL: Duration = Duration::from_secs(10);

fn at(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

#[test]
fn next_boundary_aligns_to_interval_multiples() {
    assert_eq!(next_boundary(at(0), INTERVAL), Duration::from_secs(10));
    assert_eq!(next_boundary(at(3), INTERVAL), Duration::from_secs(7));
    assert_eq!(next_boundary(at(10), INTERVAL), Duration::from_secs(10));
    assert_eq!(next_boundary(at(19), INTERVAL), Duration::from_secs(1));
}

#[tokio::test]
async fn emits_ticks_on_interval_boundaries() {
    let clock = FakeClock::new();
    let ticker = Ticker::new(clock.clone(), INTERVAL);
    let cancel = CancellationToken::new();
    let mut ticks = ticker.start(cancel.clone());

    clock.wait_for_sleepers(1).await;
    clock.advance(INTERVAL);
    assert_eq!(ticks.recv().await.unwrap(), at(10));

    clock.wait_for_sleepers(1).await;
    clock.advance(INTERVAL);
    assert_eq!(ticks.recv().await.unwrap(), at(20));

    cancel.cancel();
}

#[tokio::test]
async fn first_tick_aligns_from_a_misaligned_start() {
    let clock = FakeClock::new();
    clock.advance(Duration::from_secs(3));
    let ticker = Ticker::new(clock.clone(), INTERVAL);
    let cancel = CancellationToken::new();
    let mut ticks = ticker.start(cancel.clone());

    clock.wait_for_sleeper_until(at(10)).await;
    clock.advance(Duration::from_secs(7));
    assert_eq!(ticks.recv().await.unwrap(), at(10));

    cancel.cancel();
}

#[tokio::test]
async fn paused_ticker_skips_boundaries_without_backfill() {
    let clock = FakeClock::new();
    let ticker = Ticker::new(clock.clone(), INTERVAL);
    let cancel = CancellationToken::new();
    let mut ticks = ticker.start(cancel.clone());

    // Pausing twice equals pausing once.
    ticker.pause();
    ticker.pause();

    clock.wait_for_sleepers(1).await;
    clock.advance(INTERVAL);
    // The boundary passed while paused: the heartbeat re-arms for the
    // next one without emitting.
    clock.wait_for_sleeper_until(at(20)).await;
    assert!(ticks.try_recv().is_err());

    ticker.unpause();
    ticker.unpause();
    clock.advance(INTERVAL);
    // Only the natural boundary after unpause fires; nothing is
    // backfilled for the missed one.
    assert_eq!(ticks.recv().await.unwrap(), at(20));

    cancel.cancel();
}

#[tokio::test]
async fn cancellation_stops_the_heartbeat() {
    let clock = FakeClock::new();
    let ticker = Ticker::new(clock.clone(), INTERVAL);
    let cancel = CancellationToken::new();
    let mut ticks = ticker.start(cancel.clone());

    clock.wait_for_sleepers(1).await;
    cancel.cancel();
    assert!(ticks.recv().await.is_none());
}

#[tokio::test]
async fn dropping_the_receiver_stops_the_heartbeat() {
    let clock = FakeClock::new();
    let ticker = Ticker::new(clock.clone(), INTERVAL);
    let ticks = ticker.start(CancellationToken::new());
    drop(ticks);

    clock.wait_for_sleepers(1).await;
    clock.advance(INTERVAL);
    // The send fails and the task exits; no sleeper is re-armed.
    crate::test_helpers::settle().await;
    assert_eq!(clock.sleeper_count(), 0);
}
