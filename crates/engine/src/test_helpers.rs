// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for the engine crate.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tocsin_adapters::{FakeEvaluator, FakeStore};
use tocsin_core::{AlertDefinition, Clock, DefinitionKey, FakeClock};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::SchedulerError;
use crate::scheduler::{Scheduler, SchedulerConfig, SchedulerDeps};

pub(crate) const BASE_INTERVAL: Duration = Duration::from_secs(10);

/// A fired `eval_applied` hook: which key, and the as-of timestamp.
pub(crate) type Applied = (DefinitionKey, SystemTime);

/// Convenience alias for the fully-typed test scheduler.
pub(crate) type TestScheduler = Scheduler<FakeStore, FakeEvaluator, FakeClock>;

pub(crate) struct TestContext {
    pub scheduler: Arc<TestScheduler>,
    pub clock: FakeClock,
    pub store: FakeStore,
    pub evaluator: FakeEvaluator,
    pub applied_rx: mpsc::UnboundedReceiver<Applied>,
    pub cancel: CancellationToken,
}

/// Build a scheduler over fakes with the default test config.
pub(crate) fn setup() -> TestContext {
    setup_with(SchedulerConfig {
        base_interval: BASE_INTERVAL,
        max_attempts: 3,
    })
}

pub(crate) fn setup_with(config: SchedulerConfig) -> TestContext {
    let clock = FakeClock::new();
    let store = FakeStore::new();
    let evaluator = FakeEvaluator::new();
    let (applied_tx, applied_rx) = mpsc::unbounded_channel();
    let scheduler = Scheduler::new(
        SchedulerDeps {
            store: store.clone(),
            evaluator: evaluator.clone(),
            clock: clock.clone(),
        },
        config,
    )
    .unwrap()
    .with_eval_applied(Arc::new(move |key, now| {
        let _ = applied_tx.send((key.clone(), now));
    }));

    TestContext {
        scheduler: Arc::new(scheduler),
        clock,
        store,
        evaluator,
        applied_rx,
        cancel: CancellationToken::new(),
    }
}

impl TestContext {
    /// Spawn the dispatch loop under the context's cancel token.
    pub fn start(&self) -> tokio::task::JoinHandle<Result<(), SchedulerError>> {
        let scheduler = Arc::clone(&self.scheduler);
        let cancel = self.cancel.clone();
        tokio::spawn(async move { scheduler.run(cancel).await })
    }

    /// Advance the fake clock to the next tick boundary, waiting first for
    /// the heartbeat to arm its sleep so the boundary is not skipped over.
    /// Returns the tick timestamp.
    pub async fn tick(&self) -> SystemTime {
        let now = self.clock.now();
        let since_epoch = now
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("fake clock before epoch");
        let base = BASE_INTERVAL.as_secs();
        let boundary_secs = (since_epoch.as_secs() / base + 1) * base;
        let boundary = SystemTime::UNIX_EPOCH + Duration::from_secs(boundary_secs);
        self.clock.wait_for_sleeper_until(boundary).await;
        self.clock
            .advance(boundary.duration_since(now).expect("boundary behind now"));
        boundary
    }

    /// Await the next hook firing, with a real-time safety timeout.
    pub async fn next_applied(&mut self) -> Applied {
        tokio::time::timeout(Duration::from_secs(5), self.applied_rx.recv())
            .await
            .expect("timed out waiting for an evaluation")
            .expect("hook channel closed")
    }

    /// Let all in-flight dispatch work settle, then assert no evaluation
    /// completed in the meantime.
    pub async fn assert_no_applied(&mut self) {
        settle().await;
        assert!(
            self.applied_rx.try_recv().is_err(),
            "unexpected evaluation completed"
        );
    }
}

/// Drive the runtime until spawned tasks have had ample chance to run.
pub(crate) async fn settle() {
    for _ in 0..100 {
        tokio::task::yield_now().await;
    }
}

/// A definition with the given coordinates and a fixed condition payload.
pub(crate) fn definition(
    org_id: i64,
    uid: &str,
    version: i64,
    interval_seconds: i64,
) -> AlertDefinition {
    AlertDefinition {
        org_id,
        uid: uid.to_string(),
        title: format!("definition {}", uid),
        version,
        interval_seconds,
        condition: "C".to_string(),
        data: vec![serde_json::json!({"refId": "A", "expr": "up"})],
    }
}

/// Timestamp `secs` after the epoch.
pub(crate) fn at(secs: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
}
