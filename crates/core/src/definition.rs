// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Alert definitions and their canonical scheduler keys.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

const SEPARATOR: char = ':';

/// A declarative alert: a condition evaluated on a fixed cadence.
///
/// Definitions are owned by the definition store; the scheduler treats them
/// as read-only input, refreshed on every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertDefinition {
    /// Organization that owns the definition.
    pub org_id: i64,
    /// Stable identifier, unique within the org.
    pub uid: String,
    /// Human-readable title.
    pub title: String,
    /// Monotonic version, bumped on every update.
    pub version: i64,
    /// Evaluation cadence in seconds. Must be a positive multiple of the
    /// scheduler base interval.
    pub interval_seconds: i64,
    /// Ref id of the query that produces the alert condition.
    pub condition: String,
    /// Queries and expressions forwarded verbatim to the evaluator.
    pub data: Vec<serde_json::Value>,
}

impl AlertDefinition {
    /// The canonical scheduler key for this definition.
    pub fn key(&self) -> DefinitionKey {
        DefinitionKey::new(self.org_id, &self.uid)
    }
}

/// Canonical `"<org_id>:<uid>"` key identifying one definition worker
/// within a scheduler instance.
///
/// Construction is total: `org_id` is a decimal integer, so the separator
/// needs no escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DefinitionKey(String);

impl DefinitionKey {
    pub fn new(org_id: i64, uid: &str) -> Self {
        Self(format!("{}{}{}", org_id, SEPARATOR, uid))
    }

    /// Get the string value of this key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DefinitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<str> for DefinitionKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for DefinitionKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for DefinitionKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "definition_tests.rs"]
mod tests;
