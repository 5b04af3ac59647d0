// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake condition evaluator for testing

use super::{Condition, ConditionEvaluator, EvalError, EvalResult, EvalState};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::watch;

/// Recorded evaluation call
#[derive(Debug, Clone)]
pub struct EvalCall {
    pub condition: Condition,
    pub now: SystemTime,
}

struct FakeEvaluatorState {
    results: Vec<EvalResult>,
    fail_times: u32,
    calls: Vec<EvalCall>,
}

/// Fake condition evaluator for testing.
///
/// Returns a configurable result set, can fail the next N calls, and can
/// hold evaluations open behind a gate so tests can observe a worker that
/// is busy mid-evaluation. Calls are recorded before the gate, so a test
/// can see an in-flight evaluation.
#[derive(Clone)]
pub struct FakeEvaluator {
    inner: Arc<Mutex<FakeEvaluatorState>>,
    gate: Arc<watch::Sender<bool>>,
}

impl Default for FakeEvaluator {
    fn default() -> Self {
        let (gate, _) = watch::channel(false);
        Self {
            inner: Arc::new(Mutex::new(FakeEvaluatorState {
                results: vec![EvalResult {
                    instance: "instance-1".to_string(),
                    state: EvalState::Normal,
                }],
                fail_times: 0,
                calls: Vec::new(),
            })),
            gate: Arc::new(gate),
        }
    }
}

impl FakeEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the result set returned on success.
    pub fn set_results(&self, results: Vec<EvalResult>) {
        self.inner.lock().results = results;
    }

    /// Fail the next `count` evaluations.
    pub fn fail_times(&self, count: u32) {
        self.inner.lock().fail_times = count;
    }

    /// Hold every evaluation open until `unblock` is called.
    pub fn block(&self) {
        self.gate.send_replace(true);
    }

    /// Release evaluations held by `block`.
    pub fn unblock(&self) {
        self.gate.send_replace(false);
    }

    /// All recorded evaluation calls, in call order.
    pub fn calls(&self) -> Vec<EvalCall> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl ConditionEvaluator for FakeEvaluator {
    async fn evaluate(
        &self,
        condition: &Condition,
        now: SystemTime,
    ) -> Result<Vec<EvalResult>, EvalError> {
        self.inner.lock().calls.push(EvalCall {
            condition: condition.clone(),
            now,
        });

        let mut gate = self.gate.subscribe();
        gate.wait_for(|blocked| !*blocked).await.ok();

        let mut state = self.inner.lock();
        if state.fail_times > 0 {
            state.fail_times -= 1;
            return Err(EvalError::Failed("injected evaluation failure".into()));
        }
        Ok(state.results.clone())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
