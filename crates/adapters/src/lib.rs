// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for the scheduler's external collaborators
//!
//! The scheduler consumes the definition store and the condition evaluator
//! through the traits here. Production implementations live with their
//! owning services; the fakes are only compiled for tests or behind the
//! `test-support` feature.

pub mod evaluator;
pub mod store;

pub use evaluator::{Condition, ConditionEvaluator, EvalError, EvalResult, EvalState};
pub use store::{DefinitionStore, StoreError};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use evaluator::{EvalCall, FakeEvaluator};
#[cfg(any(test, feature = "test-support"))]
pub use store::FakeStore;
