// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Definition store adapter

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeStore;

use async_trait::async_trait;
use std::time::SystemTime;
use thiserror::Error;
use tocsin_core::AlertDefinition;

/// Errors from definition store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("alert definition not found: {org_id}:{uid}")]
    NotFound { org_id: i64, uid: String },

    #[error("query failed: {0}")]
    QueryFailed(String),
}

/// Adapter for the alert definition store.
///
/// `list_definitions` drives per-tick reconciliation; `get_by_uid` is the
/// point lookup a worker issues when the dispatcher announces a newer
/// version than its cached copy.
#[async_trait]
pub trait DefinitionStore: Clone + Send + Sync + 'static {
    /// All alert definitions that exist as of `as_of`.
    async fn list_definitions(
        &self,
        as_of: SystemTime,
    ) -> Result<Vec<AlertDefinition>, StoreError>;

    /// The latest version of one definition.
    async fn get_by_uid(&self, org_id: i64, uid: &str) -> Result<AlertDefinition, StoreError>;
}
