// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    copy    = { "cp",    Operation::Copy },
    rename  = { "mv",    Operation::Move },
    remove  = { "rm",    Operation::Remove },
    mkdir   = { "mkdir", Operation::MakeDir },
    merge   = { "merge", Operation::Merge },
)]
fn known_tags_map_to_operations(tag: &str, expected: Operation) {
    let op = Operation::from(tag);
    assert_eq!(op, expected);
    assert_eq!(op.known_tag(), Some(tag));
    assert_eq!(op.tag(), tag);
}

#[test]
fn unknown_tag_is_preserved() {
    let op = Operation::from("chmod");
    assert_eq!(op, Operation::Unknown("chmod".to_string()));
    assert_eq!(op.known_tag(), None);
    assert_eq!(op.to_string(), "chmod");
}

#[test]
fn tags_are_case_sensitive() {
    assert_eq!(Operation::from("CP").known_tag(), None);
}

#[test]
fn decode_merge_envelope() {
    let body = br#"{"ops": "merge", "args": ["/tmp/multi-bunny", "bunny.zip"], "id": "12345", "done": "merge-done"}"#;
    let cmd = Command::decode(body).unwrap();
    assert_eq!(cmd.operation, Operation::Merge);
    assert_eq!(cmd.args, vec!["/tmp/multi-bunny", "bunny.zip"]);
    assert_eq!(cmd.id, "12345");
    assert_eq!(cmd.completion_queue, "merge-done");
}

#[test]
fn decode_fills_missing_fields_with_defaults() {
    let cmd = Command::decode(br#"{"ops":"rm","args":["/tmp/x"]}"#).unwrap();
    assert_eq!(cmd.operation, Operation::Remove);
    assert!(cmd.id.is_empty());
    assert!(cmd.completion_queue.is_empty());

    let cmd = Command::decode(b"{}").unwrap();
    assert_eq!(cmd, Command::default());
    assert_eq!(cmd.operation, Operation::Unknown(String::new()));
}

#[test]
fn decode_rejects_malformed_bodies() {
    assert!(Command::decode(b"not json").is_err());
    assert!(Command::decode(br#"{"ops":"cp","args":"/tmp/a"}"#).is_err());
}

#[test]
fn encode_uses_wire_field_names() {
    let cmd = Command::new("merge", &["/tmp/parts"])
        .with_id("42")
        .with_completion_queue("merge-done");
    let value: serde_json::Value = serde_json::from_slice(&cmd.encode().unwrap()).unwrap();
    assert_eq!(
        value,
        serde_json::json!({"ops": "merge", "args": ["/tmp/parts"], "id": "42", "done": "merge-done"})
    );
}

#[test]
fn unknown_operation_reencodes_verbatim() {
    let cmd = Command::decode(br#"{"ops":"touch","args":["a"],"id":"7"}"#).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&cmd.encode().unwrap()).unwrap();
    assert_eq!(value["ops"], "touch");
}
