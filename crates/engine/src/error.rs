// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the scheduler engine

use thiserror::Error;
use tocsin_adapters::{EvalError, StoreError};

/// Errors that can occur in the scheduler
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler is not initialised")]
    NotInitialized,
    #[error("invalid scheduler configuration: {0}")]
    InvalidConfig(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("evaluation error: {0}")]
    Evaluation(#[from] EvalError),
    #[error("definition routine panicked: {0}")]
    RoutinePanic(String),
    #[error("scheduler cancelled")]
    Cancelled,
}
