// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The definition routine: owns evaluation for one alert definition.

use tocsin_adapters::{Condition, ConditionEvaluator, DefinitionStore};
use tocsin_core::{AlertDefinition, Clock, DefinitionKey};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::SchedulerError;
use crate::scheduler::{EvalAppliedHook, EvalRequest};

/// Long-lived task evaluating one definition serially.
///
/// Requests arrive on the evaluation channel; at most one evaluation is in
/// flight, and requests that land while one runs are dropped when it
/// completes. The worker exits on its stop token (set when the definition
/// disappears from the store), on cancellation of the whole group, or when
/// the evaluation channel closes.
pub(crate) struct DefinitionWorker<S, E, C> {
    uid: String,
    org_id: i64,
    key: DefinitionKey,
    store: S,
    evaluator: E,
    clock: C,
    max_attempts: i64,
    eval_applied: Option<EvalAppliedHook>,
}

impl<S, E, C> DefinitionWorker<S, E, C>
where
    S: DefinitionStore,
    E: ConditionEvaluator,
    C: Clock,
{
    pub fn new(
        uid: String,
        org_id: i64,
        store: S,
        evaluator: E,
        clock: C,
        max_attempts: i64,
        eval_applied: Option<EvalAppliedHook>,
    ) -> Self {
        let key = DefinitionKey::new(org_id, &uid);
        Self {
            uid,
            org_id,
            key,
            store,
            evaluator,
            clock,
            max_attempts,
            eval_applied,
        }
    }

    pub async fn run(
        self,
        parent: CancellationToken,
        stop: CancellationToken,
        mut eval_rx: mpsc::Receiver<EvalRequest>,
    ) -> Result<(), SchedulerError> {
        debug!(
            definition_uid = %self.uid,
            org_id = self.org_id,
            "alert definition routine started"
        );

        let mut definition: Option<AlertDefinition> = None;
        loop {
            tokio::select! {
                maybe_request = eval_rx.recv() => {
                    let Some(request) = maybe_request else {
                        return Ok(());
                    };
                    self.run_eval(&mut definition, &request).await;
                    // Requests that piled up while the evaluation ran are
                    // stale; the next tick supersedes them.
                    while eval_rx.try_recv().is_ok() {}
                    if let Some(eval_applied) = &self.eval_applied {
                        eval_applied(&self.key, request.now);
                    }
                }
                _ = stop.cancelled() => {
                    debug!(
                        definition_uid = %self.uid,
                        org_id = self.org_id,
                        "stopping alert definition routine"
                    );
                    return Ok(());
                }
                _ = parent.cancelled() => {
                    return Err(SchedulerError::Cancelled);
                }
            }
        }
    }

    /// One evaluation sequence, retried wholesale up to `max_attempts`.
    /// Errors are logged per attempt and absorbed.
    async fn run_eval(&self, definition: &mut Option<AlertDefinition>, request: &EvalRequest) {
        for attempt in 0..self.max_attempts {
            if self.evaluate(definition, request, attempt).await.is_ok() {
                break;
            }
        }
    }

    async fn evaluate(
        &self,
        definition: &mut Option<AlertDefinition>,
        request: &EvalRequest,
        attempt: i64,
    ) -> Result<(), SchedulerError> {
        let start = self.clock.now();

        // Re-fetch when the dispatcher has announced a newer version than
        // the cached copy (or nothing is cached yet).
        let condition = match definition.as_ref() {
            Some(cached) if cached.version >= request.version => {
                Condition::from_definition(cached)
            }
            _ => {
                let fetched = match self.store.get_by_uid(self.org_id, &self.uid).await {
                    Ok(fetched) => fetched,
                    Err(err) => {
                        let duration =
                            self.clock.now().duration_since(start).unwrap_or_default();
                        error!(
                            definition_uid = %self.uid,
                            org_id = self.org_id,
                            attempt,
                            now = ?request.now,
                            duration = ?duration,
                            error = %err,
                            "failed to fetch alert definition"
                        );
                        return Err(err.into());
                    }
                };
                debug!(
                    definition_uid = %self.uid,
                    org_id = self.org_id,
                    version = fetched.version,
                    "new alert definition version fetched"
                );
                let condition = Condition::from_definition(&fetched);
                *definition = Some(fetched);
                condition
            }
        };
        let result = self.evaluator.evaluate(&condition, request.now).await;
        let duration = self.clock.now().duration_since(start).unwrap_or_default();
        match result {
            Ok(results) => {
                for result in &results {
                    info!(
                        definition_uid = %self.uid,
                        org_id = self.org_id,
                        attempt,
                        now = ?request.now,
                        duration = ?duration,
                        instance = %result.instance,
                        state = %result.state,
                        "alert definition result"
                    );
                }
                Ok(())
            }
            Err(err) => {
                error!(
                    definition_uid = %self.uid,
                    org_id = self.org_id,
                    attempt,
                    now = ?request.now,
                    duration = ?duration,
                    error = %err,
                    "failed to evaluate alert definition"
                );
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
