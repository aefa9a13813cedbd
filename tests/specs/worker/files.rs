// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File operation specs
//!
//! Each job runs to completion and is acknowledged, success or not.

use crate::prelude::*;
use std::os::unix::fs::PermissionsExt;

#[tokio::test]
#[serial(umask)]
async fn mkdir_copy_then_remove() {
    let mut worker = Worker::start().await;
    let source = worker.file("incoming/a.txt", "hello");
    let dir = worker.path("out/nested");
    let copy = dir.join("a.txt");

    worker.run(Command::new(Operation::MakeDir, &[arg(&dir), "0755"]).with_id("1")).await;
    let mode = std::fs::metadata(&dir).unwrap().permissions().mode() & 0o7777;
    assert_eq!(mode, 0o755);

    worker.run(Command::new(Operation::Copy, &[arg(&source), arg(&copy)]).with_id("2")).await;
    assert_eq!(std::fs::read_to_string(&copy).unwrap(), "hello");
    assert!(source.exists());

    worker.run(Command::new(Operation::Remove, &[arg(&worker.path("out"))]).with_id("3")).await;
    assert!(!worker.path("out").exists());
    assert_eq!(worker.transport.acks().len(), 3);
}

#[tokio::test]
async fn move_renames_in_place() {
    let mut worker = Worker::start().await;
    let source = worker.file("a.txt", "payload");
    let destination = worker.path("b.txt");

    worker.run(Command::new(Operation::Move, &[arg(&source), arg(&destination)])).await;

    assert!(!source.exists());
    assert_eq!(std::fs::read_to_string(&destination).unwrap(), "payload");
}

#[tokio::test]
async fn failed_job_is_acknowledged_and_the_next_one_runs() {
    let mut worker = Worker::start().await;
    let missing = worker.path("missing.txt");
    let source = worker.file("present.txt", "ok");
    let destination = worker.path("copied.txt");

    worker.run(Command::new(Operation::Copy, &[arg(&missing), arg(&destination)])).await;
    assert!(!destination.exists());

    worker.run(Command::new(Operation::Copy, &[arg(&source), arg(&destination)])).await;
    assert_eq!(std::fs::read_to_string(&destination).unwrap(), "ok");
    assert_eq!(worker.transport.acks().len(), 2);
}

#[tokio::test]
async fn malformed_messages_are_acknowledged() {
    let mut worker = Worker::start().await;

    worker.send_raw(b"not json".to_vec()).await;
    worker.send_raw(br#"{"ops":"cp","args":[]}"#.to_vec()).await;
    worker.send_raw(br#"{"ops":"chmod","args":["/tmp/x"]}"#.to_vec()).await;

    assert_eq!(worker.transport.acks().len(), 3);
    assert!(worker.transport.published().is_empty());
}

#[tokio::test]
async fn protected_paths_survive_remove() {
    let mut worker = Worker::start().await;
    let keep = worker.file("keep/data.txt", "precious");
    let config = DispatchConfig {
        protected_prefixes: vec![worker.root().to_string_lossy().into_owned()],
        ..Default::default()
    };
    let mut guarded = Worker::start_with(config).await;

    guarded.run(Command::new(Operation::Remove, &[arg(&worker.path("keep"))])).await;
    assert!(keep.exists());

    worker.run(Command::new(Operation::Remove, &[arg(&worker.path("keep"))])).await;
    assert!(!keep.exists());
}

#[tokio::test]
async fn removing_a_missing_path_is_not_an_error() {
    let mut worker = Worker::start().await;
    let ghost = worker.path("ghost");

    worker.run(Command::new(Operation::Remove, &[arg(&ghost)])).await;

    assert_eq!(worker.transport.acks().len(), 1);
}

#[tokio::test]
async fn copy_onto_itself_keeps_the_file() {
    let mut worker = Worker::start().await;
    let source = worker.file("a.txt", "hello");
    let same = worker.root().join(".").join("a.txt");

    worker.run(Command::new(Operation::Copy, &[arg(&source), arg(&same)])).await;

    assert_eq!(std::fs::read_to_string(&source).unwrap(), "hello");
}

#[tokio::test]
async fn parent_steps_do_not_bypass_protection() {
    let mut worker = Worker::start().await;
    let keep = worker.file("guarded/data.txt", "precious");
    worker.file("other/x", "");
    let guarded_prefix = worker.path("guarded").to_string_lossy().into_owned();
    let mut guarded = Worker::start_with(DispatchConfig {
        protected_prefixes: vec![guarded_prefix],
        ..Default::default()
    })
    .await;

    let sneaky = worker.path("other/../guarded");
    guarded.run(Command::new(Operation::Remove, &[arg(&sneaky)])).await;

    assert!(keep.exists());
}
