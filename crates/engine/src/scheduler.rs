// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dispatcher: per-tick reconciliation and jittered fan-out.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tocsin_adapters::{ConditionEvaluator, DefinitionStore};
use tocsin_core::{Clock, DefinitionKey};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::SchedulerError;
use crate::registry::{DefinitionInfo, Registry};
use crate::ticker::Ticker;
use crate::worker::DefinitionWorker;

/// One evaluation request sent from the dispatcher to a worker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalRequest {
    /// Tick timestamp, used verbatim as the evaluation as-of time.
    pub now: SystemTime,
    /// Latest known definition version at dispatch time.
    pub version: i64,
}

/// Test hook invoked by a worker after every completed evaluation
/// (success or exhaustion; never for requests dropped due to overlap).
pub type EvalAppliedHook = Arc<dyn Fn(&DefinitionKey, SystemTime) + Send + Sync>;

/// Scheduler adapter dependencies
pub struct SchedulerDeps<S, E, C> {
    pub store: S,
    pub evaluator: E,
    pub clock: C,
}

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Fundamental tick period. Every definition interval must be a
    /// multiple of it.
    pub base_interval: Duration,
    /// Attempts per evaluation, including the first.
    pub max_attempts: i64,
}

impl SchedulerConfig {
    fn validate(&self) -> Result<(), SchedulerError> {
        if self.base_interval.is_zero() {
            return Err(SchedulerError::InvalidConfig(
                "base interval must be positive".into(),
            ));
        }
        if self.base_interval.subsec_nanos() != 0 {
            return Err(SchedulerError::InvalidConfig(
                "base interval must be a whole number of seconds".into(),
            ));
        }
        if self.max_attempts < 1 {
            return Err(SchedulerError::InvalidConfig(
                "max attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// The per-tick reconciliation and fan-out loop.
///
/// Owns the heartbeat ticker, the worker registry, and (while running) a
/// task group with one worker per live alert definition.
pub struct Scheduler<S, E, C: Clock> {
    store: S,
    evaluator: E,
    clock: C,
    base_interval: Duration,
    max_attempts: i64,
    heartbeat: Ticker<C>,
    pub(crate) registry: Registry,
    eval_applied: Option<EvalAppliedHook>,
}

impl<S, E, C> Scheduler<S, E, C>
where
    S: DefinitionStore,
    E: ConditionEvaluator,
    C: Clock,
{
    pub fn new(deps: SchedulerDeps<S, E, C>, config: SchedulerConfig) -> Result<Self, SchedulerError> {
        config.validate()?;
        let heartbeat = Ticker::new(deps.clock.clone(), config.base_interval);
        Ok(Self {
            store: deps.store,
            evaluator: deps.evaluator,
            clock: deps.clock,
            base_interval: config.base_interval,
            max_attempts: config.max_attempts,
            heartbeat,
            registry: Registry::new(),
            eval_applied: None,
        })
    }

    /// Install the evaluation hook. Only used for tests: the hook is
    /// called from each worker's event loop after an evaluation completes.
    pub fn with_eval_applied(mut self, hook: EvalAppliedHook) -> Self {
        self.eval_applied = Some(hook);
        self
    }

    /// Stop dispatching. Idempotent; live workers are unaffected.
    pub fn pause(&self) {
        self.heartbeat.pause();
        info!(now = ?self.clock.now(), "alert definition scheduler paused");
    }

    /// Resume dispatching at the next tick boundary. Idempotent; missed
    /// ticks are not backfilled.
    pub fn unpause(&self) {
        self.heartbeat.unpause();
        info!(now = ?self.clock.now(), "alert definition scheduler unpaused");
    }

    /// Run the dispatch loop until `parent` is cancelled or a worker
    /// fails, then drain the worker group and return its aggregated
    /// error: the first non-cancellation failure, or [`SchedulerError::
    /// Cancelled`] after a clean shutdown.
    pub async fn run(&self, parent: CancellationToken) -> Result<(), SchedulerError> {
        let group = parent.child_token();
        let mut workers: JoinSet<Result<(), SchedulerError>> = JoinSet::new();
        let mut ticks = self.heartbeat.start(group.child_token());
        let mut first_err: Option<SchedulerError> = None;

        loop {
            tokio::select! {
                _ = group.cancelled() => break,
                maybe_tick = ticks.recv() => match maybe_tick {
                    Some(tick) => self.on_tick(tick, &mut workers, &group).await,
                    None => break,
                },
                Some(joined) = workers.join_next(), if !workers.is_empty() => {
                    if let Some(err) = routine_failure(joined) {
                        error!(error = %err, "definition routine failed, shutting scheduler down");
                        first_err.get_or_insert(err);
                        group.cancel();
                    }
                }
            }
        }

        // Unwind: every worker observes the group token. Per-key stop
        // tokens still pending are abandoned, not drained.
        group.cancel();
        while let Some(joined) = workers.join_next().await {
            if let Some(err) = routine_failure(joined) {
                first_err.get_or_insert(err);
            }
        }
        Err(first_err.unwrap_or(SchedulerError::Cancelled))
    }

    async fn on_tick(
        &self,
        tick: SystemTime,
        workers: &mut JoinSet<Result<(), SchedulerError>>,
        group: &CancellationToken,
    ) {
        let base_seconds = self.base_interval.as_secs() as i64;
        let tick_num = epoch_seconds(tick) / base_seconds;

        let definitions = match self.store.list_definitions(tick).await {
            Ok(definitions) => definitions,
            Err(err) => {
                // A failed fetch must not tear down live workers; skip the
                // whole tick and let the next one retry.
                error!(error = %err, "failed to fetch alert definitions, skipping tick");
                return;
            }
        };
        debug!(count = definitions.len(), "alert definitions fetched");

        // Keys known from previous ticks. Every key seen in this cycle is
        // removed below, leaving exactly the deleted definitions.
        let mut surviving = self.registry.key_map();

        let mut ready_to_run: Vec<(DefinitionKey, DefinitionInfo)> = Vec::new();
        for definition in definitions {
            let key = definition.key();

            if definition.interval_seconds < 0
                || definition.interval_seconds % base_seconds != 0
            {
                debug!(
                    definition_uid = %definition.uid,
                    org_id = definition.org_id,
                    interval_seconds = definition.interval_seconds,
                    base_seconds,
                    "alert definition with invalid interval will be ignored: interval should be divided exactly by scheduler interval"
                );
                // An already-running worker stays registered so the
                // definition is picked up again once its interval is
                // corrected.
                surviving.remove(&key);
                continue;
            }

            let (info, eval_rx) =
                self.registry
                    .get_or_create(&definition.uid, definition.org_id, definition.version);
            if let Some(eval_rx) = eval_rx {
                let worker = DefinitionWorker::new(
                    definition.uid.clone(),
                    definition.org_id,
                    self.store.clone(),
                    self.evaluator.clone(),
                    self.clock.clone(),
                    self.max_attempts,
                    self.eval_applied.clone(),
                );
                let parent = group.child_token();
                let stop = info.stop.clone();
                workers.spawn(worker.run(parent, stop, eval_rx));
            }

            if definition.interval_seconds != 0 {
                let frequency = definition.interval_seconds / base_seconds;
                if tick_num % frequency == 0 {
                    ready_to_run.push((key.clone(), info));
                }
            }

            surviving.remove(&key);
        }

        // Definitions no longer in the store: release their workers.
        for key in surviving {
            debug!(key = %key, "stopping routine for deleted alert definition");
            self.registry.del(&key);
        }

        self.fan_out(tick, ready_to_run);
    }

    /// Spread the tick's evaluation requests over the tick window: request
    /// `i` fires `i * step` after the tick, `step = base_interval / n`.
    /// Sends never block the dispatcher; a busy or released worker means
    /// the request is dropped.
    fn fan_out(&self, tick: SystemTime, ready_to_run: Vec<(DefinitionKey, DefinitionInfo)>) {
        let step = dispatch_step(self.base_interval, ready_to_run.len());
        for (i, (key, info)) in ready_to_run.into_iter().enumerate() {
            let offset = step * i as u32;
            let clock = self.clock.clone();
            let request = EvalRequest {
                now: tick,
                version: info.version,
            };
            tokio::spawn(async move {
                clock.sleep(offset).await;
                if let Err(err) = info.eval_tx.try_send(request) {
                    debug!(key = %key, error = %err, "evaluation request dropped");
                }
            });
        }
    }
}

/// Gap between consecutive dispatches within one tick window.
fn dispatch_step(base_interval: Duration, ready: usize) -> Duration {
    if ready == 0 {
        Duration::ZERO
    } else {
        base_interval / ready as u32
    }
}

fn epoch_seconds(t: SystemTime) -> i64 {
    t.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

fn routine_failure(
    joined: Result<Result<(), SchedulerError>, tokio::task::JoinError>,
) -> Option<SchedulerError> {
    match joined {
        Ok(Ok(())) | Ok(Err(SchedulerError::Cancelled)) => None,
        Ok(Err(err)) => Some(err),
        Err(join_err) if join_err.is_cancelled() => None,
        Err(join_err) => Some(SchedulerError::RoutinePanic(join_err.to_string())),
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
