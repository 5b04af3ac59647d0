// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the fake definition store.

use super::*;

fn definition(org_id: i64, uid: &str, version: i64) -> AlertDefinition {
    AlertDefinition {
        org_id,
        uid: uid.to_string(),
        title: format!("def {}", uid),
        version,
        interval_seconds: 10,
        condition: "C".to_string(),
        data: Vec::new(),
    }
}

#[tokio::test]
async fn lists_served_definitions_and_records_calls() {
    let store = FakeStore::new();
    store.set_definitions(vec![definition(1, "a", 1), definition(2, "b", 3)]);

    let as_of = SystemTime::UNIX_EPOCH;
    let listed = store.list_definitions(as_of).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(store.list_calls(), vec![as_of]);
}

#[tokio::test]
async fn get_by_uid_returns_match_or_not_found() {
    let store = FakeStore::new();
    store.set_definitions(vec![definition(1, "a", 4)]);

    let found = store.get_by_uid(1, "a").await.unwrap();
    assert_eq!(found.version, 4);

    let missing = store.get_by_uid(1, "nope").await;
    assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    assert_eq!(
        store.get_calls(),
        vec![(1, "a".to_string()), (1, "nope".to_string())]
    );
}

#[tokio::test]
async fn injected_failures_are_consumed_in_order() {
    let store = FakeStore::new();
    store.set_definitions(vec![definition(1, "a", 1)]);
    store.fail_next_get(2);

    assert!(store.get_by_uid(1, "a").await.is_err());
    assert!(store.get_by_uid(1, "a").await.is_err());
    assert!(store.get_by_uid(1, "a").await.is_ok());

    store.fail_next_list(1);
    assert!(store.list_definitions(SystemTime::UNIX_EPOCH).await.is_err());
    assert!(store.list_definitions(SystemTime::UNIX_EPOCH).await.is_ok());
}
