// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle facade over the scheduler: init, pause, unpause, run.

use std::sync::Arc;

use tocsin_adapters::{ConditionEvaluator, DefinitionStore};
use tocsin_core::Clock;
use tokio_util::sync::CancellationToken;

use crate::error::SchedulerError;
use crate::scheduler::{Scheduler, SchedulerConfig, SchedulerDeps};

/// Owns the scheduler once initialised.
///
/// Deployments may leave alerting disabled: the service exists either way,
/// and lifecycle calls before [`init`](Self::init) report
/// [`SchedulerError::NotInitialized`] instead of panicking.
pub struct AlertService<S, E, C: Clock> {
    scheduler: Option<Arc<Scheduler<S, E, C>>>,
}

impl<S, E, C> AlertService<S, E, C>
where
    S: DefinitionStore,
    E: ConditionEvaluator,
    C: Clock,
{
    pub fn new() -> Self {
        Self { scheduler: None }
    }

    /// Validate the configuration and build the scheduler.
    pub fn init(
        &mut self,
        deps: SchedulerDeps<S, E, C>,
        config: SchedulerConfig,
    ) -> Result<(), SchedulerError> {
        self.scheduler = Some(Arc::new(Scheduler::new(deps, config)?));
        Ok(())
    }

    /// The scheduler, if initialised.
    pub fn scheduler(&self) -> Option<&Arc<Scheduler<S, E, C>>> {
        self.scheduler.as_ref()
    }

    pub fn pause(&self) -> Result<(), SchedulerError> {
        let scheduler = self.scheduler.as_ref().ok_or(SchedulerError::NotInitialized)?;
        scheduler.pause();
        Ok(())
    }

    pub fn unpause(&self) -> Result<(), SchedulerError> {
        let scheduler = self.scheduler.as_ref().ok_or(SchedulerError::NotInitialized)?;
        scheduler.unpause();
        Ok(())
    }

    /// Run the dispatch loop until `cancel` fires; returns the worker
    /// group's aggregated error (`Cancelled` after a clean shutdown).
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), SchedulerError> {
        let scheduler = self.scheduler.as_ref().ok_or(SchedulerError::NotInitialized)?;
        scheduler.run(cancel).await
    }
}

impl<S, E, C> Default for AlertService<S, E, C>
where
    S: DefinitionStore,
    E: ConditionEvaluator,
    C: Clock,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
