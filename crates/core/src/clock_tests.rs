// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the fake clock.

use super::*;
use std::sync::atomic::{AtomicBool, Ordering};

#[test]
fn starts_at_epoch_and_advances() {
    let clock = FakeClock::new();
    assert_eq!(clock.now(), SystemTime::UNIX_EPOCH);

    clock.advance(Duration::from_secs(30));
    assert_eq!(
        clock.now(),
        SystemTime::UNIX_EPOCH + Duration::from_secs(30)
    );
}

#[test]
fn clones_share_state() {
    let clock = FakeClock::new();
    let other = clock.clone();
    clock.advance(Duration::from_secs(5));
    assert_eq!(other.now(), SystemTime::UNIX_EPOCH + Duration::from_secs(5));
}

#[tokio::test]
async fn zero_duration_sleep_returns_immediately() {
    let clock = FakeClock::new();
    clock.sleep(Duration::ZERO).await;
}

#[tokio::test]
async fn advance_wakes_due_sleepers_only() {
    let clock = FakeClock::new();
    let woke_short = Arc::new(AtomicBool::new(false));
    let woke_long = Arc::new(AtomicBool::new(false));

    let short = tokio::spawn({
        let clock = clock.clone();
        let woke = Arc::clone(&woke_short);
        async move {
            clock.sleep(Duration::from_secs(10)).await;
            woke.store(true, Ordering::SeqCst);
        }
    });
    let long = tokio::spawn({
        let clock = clock.clone();
        let woke = Arc::clone(&woke_long);
        async move {
            clock.sleep(Duration::from_secs(20)).await;
            woke.store(true, Ordering::SeqCst);
        }
    });

    clock.wait_for_sleepers(2).await;
    clock.advance(Duration::from_secs(10));
    short.await.unwrap();
    assert!(woke_short.load(Ordering::SeqCst));
    assert!(!woke_long.load(Ordering::SeqCst));

    clock.advance(Duration::from_secs(10));
    long.await.unwrap();
    assert!(woke_long.load(Ordering::SeqCst));
}

#[tokio::test]
async fn wait_for_sleeper_until_sees_exact_deadline() {
    let clock = FakeClock::new();
    let task = tokio::spawn({
        let clock = clock.clone();
        async move { clock.sleep(Duration::from_secs(7)).await }
    });

    clock
        .wait_for_sleeper_until(SystemTime::UNIX_EPOCH + Duration::from_secs(7))
        .await;
    clock.advance(Duration::from_secs(7));
    task.await.unwrap();
}

#[tokio::test]
async fn system_clock_sleeps_and_reads_time() {
    let clock = SystemClock;
    let before = clock.now();
    clock.sleep(Duration::from_millis(5)).await;
    assert!(clock.now() >= before);
}
