// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the worker registry.

use super::*;

#[test]
fn creates_entry_with_receiver_on_first_observation() {
    let registry = Registry::new();
    assert!(!registry.exists("a", 1));

    let (info, rx) = registry.get_or_create("a", 1, 1);
    assert!(rx.is_some(), "first observation returns the receiver");
    assert_eq!(info.version, 1);
    assert!(registry.exists("a", 1));
}

#[test]
fn refreshes_version_in_place_without_new_receiver() {
    let registry = Registry::new();
    let (first, _rx) = registry.get_or_create("a", 1, 1);

    let (second, rx) = registry.get_or_create("a", 1, 5);
    assert!(rx.is_none(), "existing entry keeps its channel");
    assert_eq!(second.version, 5);
    // Same channel as the original entry.
    assert!(first.eval_tx.same_channel(&second.eval_tx));
}

#[test]
fn entries_are_scoped_per_org() {
    let registry = Registry::new();
    registry.get_or_create("a", 1, 1);
    assert!(!registry.exists("a", 2));

    registry.get_or_create("a", 2, 1);
    assert_eq!(registry.key_map().len(), 2);
}

#[test]
fn del_cancels_the_stop_token_and_removes_the_entry() {
    let registry = Registry::new();
    let (info, _rx) = registry.get_or_create("a", 1, 1);
    let key = DefinitionKey::new(1, "a");

    registry.del(&key);
    assert!(info.stop.is_cancelled());
    assert!(!registry.exists("a", 1));

    // Deleting a missing key is a no-op.
    registry.del(&key);
}

#[test]
fn key_map_is_a_snapshot() {
    let registry = Registry::new();
    registry.get_or_create("a", 1, 1);
    registry.get_or_create("b", 1, 1);

    let snapshot = registry.key_map();
    registry.del(&DefinitionKey::new(1, "a"));

    assert_eq!(snapshot.len(), 2);
    assert_eq!(registry.key_map().len(), 1);
}
