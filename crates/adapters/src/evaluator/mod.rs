// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Condition evaluator adapter

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{EvalCall, FakeEvaluator};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;
use thiserror::Error;
use tocsin_core::AlertDefinition;

/// Errors from condition evaluation
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("condition evaluation failed: {0}")]
    Failed(String),
}

/// A condition ready for evaluation: the ref id naming the query that
/// produces the alert condition, plus the full query payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub ref_id: String,
    pub org_id: i64,
    pub queries_and_expressions: Vec<serde_json::Value>,
}

impl Condition {
    /// Build the condition a definition asks to have evaluated.
    pub fn from_definition(definition: &AlertDefinition) -> Self {
        Self {
            ref_id: definition.condition.clone(),
            org_id: definition.org_id,
            queries_and_expressions: definition.data.clone(),
        }
    }
}

/// State of one alert instance after evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvalState {
    Normal,
    Pending,
    Alerting,
    NoData,
    Error,
}

impl fmt::Display for EvalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EvalState::Normal => "Normal",
            EvalState::Pending => "Pending",
            EvalState::Alerting => "Alerting",
            EvalState::NoData => "NoData",
            EvalState::Error => "Error",
        };
        write!(f, "{}", name)
    }
}

/// Result for one instance produced by a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalResult {
    /// Labels identifying the instance, rendered as a string.
    pub instance: String,
    pub state: EvalState,
}

/// Adapter for the condition evaluator.
///
/// The scheduler forwards the condition and the as-of timestamp verbatim;
/// result semantics are entirely the evaluator's concern.
#[async_trait]
pub trait ConditionEvaluator: Clone + Send + Sync + 'static {
    /// Evaluate `condition` as of `now`, returning one result per instance.
    async fn evaluate(
        &self,
        condition: &Condition,
        now: SystemTime,
    ) -> Result<Vec<EvalResult>, EvalError>;
}
