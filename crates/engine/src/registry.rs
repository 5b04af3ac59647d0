// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker registry: one entry per live alert definition.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;
use tocsin_core::DefinitionKey;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::scheduler::EvalRequest;

/// Capacity of a worker's evaluation channel. One request may wait while
/// an evaluation runs; anything beyond that is dropped at the sender.
pub(crate) const EVAL_CHANNEL_CAPACITY: usize = 1;

/// Handle to one definition worker.
#[derive(Clone)]
pub(crate) struct DefinitionInfo {
    /// Sender half of the worker's evaluation channel.
    pub eval_tx: mpsc::Sender<EvalRequest>,
    /// Latest definition version the dispatcher has observed for this key.
    pub version: i64,
    /// Cancelled by [`Registry::del`] to release exactly this worker.
    pub stop: CancellationToken,
}

/// Thread-safe map from definition key to worker handle.
///
/// A key is present iff a worker for it is (or is about to be) running;
/// the stored version is non-decreasing over an entry's lifetime. All
/// mutations are serialized by the single mutex.
#[derive(Default)]
pub(crate) struct Registry {
    entries: Mutex<HashMap<DefinitionKey, DefinitionInfo>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the handle for `(org_id, uid)` after refreshing its stored
    /// version, creating it first if absent.
    ///
    /// The receiver half of the evaluation channel is returned exactly
    /// when the entry was created; the caller spawns the worker that will
    /// own it.
    pub fn get_or_create(
        &self,
        uid: &str,
        org_id: i64,
        version: i64,
    ) -> (DefinitionInfo, Option<mpsc::Receiver<EvalRequest>>) {
        let key = DefinitionKey::new(org_id, uid);
        let mut entries = self.entries.lock();
        match entries.get_mut(&key) {
            Some(info) => {
                info.version = version;
                (info.clone(), None)
            }
            None => {
                let (eval_tx, eval_rx) = mpsc::channel(EVAL_CHANNEL_CAPACITY);
                let info = DefinitionInfo {
                    eval_tx,
                    version,
                    stop: CancellationToken::new(),
                };
                entries.insert(key, info.clone());
                (info, Some(eval_rx))
            }
        }
    }

    pub fn exists(&self, uid: &str, org_id: i64) -> bool {
        self.entries
            .lock()
            .contains_key(&DefinitionKey::new(org_id, uid))
    }

    /// Remove the entry and release its worker via the stop token.
    ///
    /// The evaluation channel is left open: a worker mid-evaluation keeps
    /// reading until it observes the stop on its next loop iteration.
    pub fn del(&self, key: &DefinitionKey) {
        if let Some(info) = self.entries.lock().remove(key) {
            info.stop.cancel();
        }
    }

    /// Snapshot of the current keys, copied under the lock.
    pub fn key_map(&self) -> HashSet<DefinitionKey> {
        self.entries.lock().keys().cloned().collect()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
