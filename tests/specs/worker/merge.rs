// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Merge specs
//!
//! Parts are concatenated in name order, removed, and the original command
//! is echoed to its completion queue.

use crate::prelude::*;

#[tokio::test]
async fn merge_publishes_completion_after_assembling_parts() {
    let mut worker = Worker::start().await;
    worker.file("upload/movie.001", "aa");
    worker.file("upload/movie.003", "cc");
    worker.file("upload/movie.002", "bb");
    let dir = worker.path("upload");

    let cmd = Command::new(Operation::Merge, &[arg(&dir), "movie.mkv"])
        .with_id("job-42")
        .with_completion_queue("merged");
    worker.run(cmd.clone()).await;

    assert_eq!(std::fs::read_to_string(dir.join("movie.mkv")).unwrap(), "aabbcc");
    assert!(!dir.join("movie.001").exists());
    assert!(!dir.join("movie.002").exists());
    assert!(!dir.join("movie.003").exists());

    let published = worker.transport.published_to("merged");
    assert_eq!(published.len(), 1);
    assert_eq!(Command::decode(&published[0]).unwrap(), cmd);
    let raw: serde_json::Value = serde_json::from_slice(&published[0]).unwrap();
    assert_eq!(raw["ops"], "merge");
    assert_eq!(raw["id"], "job-42");
    assert_eq!(raw["done"], "merged");
}

#[tokio::test]
async fn merge_without_a_name_uses_the_first_part_stem() {
    let mut worker = Worker::start().await;
    worker.file("parts/report.part1", "one,");
    worker.file("parts/report.part2", "two");
    let dir = worker.path("parts");

    worker.run(Command::new(Operation::Merge, &[arg(&dir)])).await;

    assert_eq!(std::fs::read_to_string(dir.join("report")).unwrap(), "one,two");
    assert!(worker.transport.published().is_empty());
}

#[tokio::test]
async fn failed_merge_sends_no_completion() {
    let mut worker = Worker::start().await;
    let empty = worker.path("empty");
    std::fs::create_dir_all(&empty).unwrap();

    worker
        .run(Command::new(Operation::Merge, &[arg(&empty), "out.bin"]).with_completion_queue("merged"))
        .await;

    assert!(worker.transport.published_to("merged").is_empty());
    assert!(!empty.join("out.bin").exists());
}
