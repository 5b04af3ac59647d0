// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake definition store for testing

use super::{DefinitionStore, StoreError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::SystemTime;
use tocsin_core::AlertDefinition;

struct FakeStoreState {
    definitions: Vec<AlertDefinition>,
    list_failures: u32,
    get_failures: u32,
    list_calls: Vec<SystemTime>,
    get_calls: Vec<(i64, String)>,
}

/// Fake definition store for testing.
///
/// Serves a settable list of definitions and can be told to fail the next
/// N calls of either operation. All calls are recorded.
#[derive(Clone)]
pub struct FakeStore {
    inner: Arc<Mutex<FakeStoreState>>,
}

impl Default for FakeStore {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeStoreState {
                definitions: Vec::new(),
                list_failures: 0,
                get_failures: 0,
                list_calls: Vec::new(),
                get_calls: Vec::new(),
            })),
        }
    }
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the served definition list.
    pub fn set_definitions(&self, definitions: Vec<AlertDefinition>) {
        self.inner.lock().definitions = definitions;
    }

    /// Fail the next `count` `list_definitions` calls.
    pub fn fail_next_list(&self, count: u32) {
        self.inner.lock().list_failures = count;
    }

    /// Fail the next `count` `get_by_uid` calls.
    pub fn fail_next_get(&self, count: u32) {
        self.inner.lock().get_failures = count;
    }

    /// Timestamps passed to `list_definitions`, in call order.
    pub fn list_calls(&self) -> Vec<SystemTime> {
        self.inner.lock().list_calls.clone()
    }

    /// `(org_id, uid)` pairs passed to `get_by_uid`, in call order.
    pub fn get_calls(&self) -> Vec<(i64, String)> {
        self.inner.lock().get_calls.clone()
    }
}

#[async_trait]
impl DefinitionStore for FakeStore {
    async fn list_definitions(
        &self,
        as_of: SystemTime,
    ) -> Result<Vec<AlertDefinition>, StoreError> {
        let mut state = self.inner.lock();
        state.list_calls.push(as_of);
        if state.list_failures > 0 {
            state.list_failures -= 1;
            return Err(StoreError::QueryFailed("injected list failure".into()));
        }
        Ok(state.definitions.clone())
    }

    async fn get_by_uid(&self, org_id: i64, uid: &str) -> Result<AlertDefinition, StoreError> {
        let mut state = self.inner.lock();
        state.get_calls.push((org_id, uid.to_string()));
        if state.get_failures > 0 {
            state.get_failures -= 1;
            return Err(StoreError::QueryFailed("injected get failure".into()));
        }
        state
            .definitions
            .iter()
            .find(|d| d.org_id == org_id && d.uid == uid)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                org_id,
                uid: uid.to_string(),
            })
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
