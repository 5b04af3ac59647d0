// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the lifecycle facade.

use super::*;
use crate::test_helpers::BASE_INTERVAL;
use std::time::Duration;
use tocsin_adapters::{FakeEvaluator, FakeStore};
use tocsin_core::FakeClock;

type TestService = AlertService<FakeStore, FakeEvaluator, FakeClock>;

fn deps() -> SchedulerDeps<FakeStore, FakeEvaluator, FakeClock> {
    SchedulerDeps {
        store: FakeStore::new(),
        evaluator: FakeEvaluator::new(),
        clock: FakeClock::new(),
    }
}

fn config() -> SchedulerConfig {
    SchedulerConfig {
        base_interval: BASE_INTERVAL,
        max_attempts: 3,
    }
}

#[tokio::test]
async fn lifecycle_calls_before_init_report_not_initialised() {
    let service = TestService::new();
    assert!(matches!(
        service.pause(),
        Err(SchedulerError::NotInitialized)
    ));
    assert!(matches!(
        service.unpause(),
        Err(SchedulerError::NotInitialized)
    ));

    let cancel = CancellationToken::new();
    assert!(matches!(
        service.run(cancel).await,
        Err(SchedulerError::NotInitialized)
    ));
}

#[tokio::test]
async fn init_enables_pause_and_unpause() {
    let mut service = TestService::new();
    service.init(deps(), config()).unwrap();

    assert!(service.scheduler().is_some());
    service.pause().unwrap();
    service.pause().unwrap();
    service.unpause().unwrap();
}

#[test]
fn init_rejects_invalid_configuration() {
    let mut service = TestService::new();

    let zero_interval = SchedulerConfig {
        base_interval: Duration::ZERO,
        max_attempts: 3,
    };
    assert!(matches!(
        service.init(deps(), zero_interval),
        Err(SchedulerError::InvalidConfig(_))
    ));
    assert!(service.scheduler().is_none());

    let zero_attempts = SchedulerConfig {
        base_interval: BASE_INTERVAL,
        max_attempts: 0,
    };
    assert!(matches!(
        service.init(deps(), zero_attempts),
        Err(SchedulerError::InvalidConfig(_))
    ));
}

#[tokio::test]
async fn run_shuts_down_on_cancellation() {
    let mut service = TestService::new();
    service.init(deps(), config()).unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = service.run(cancel).await;
    assert!(matches!(result, Err(SchedulerError::Cancelled)));
}
