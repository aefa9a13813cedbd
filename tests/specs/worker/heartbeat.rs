// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Liveness specs
//!
//! Pings are answered whether or not the work loop is busy.

use crate::prelude::*;
use ferry_core::{Clock, FakeClock, HostIdentity, Machine, Timestamp};
use ferry_engine::Heartbeat;

#[tokio::test]
async fn pings_are_answered_while_a_job_is_in_flight() {
    let config = DispatchConfig {
        copy_delay: Duration::from_millis(300),
        protected_prefixes: Vec::new(),
        ..Default::default()
    };
    let worker = Worker::start_with(config).await;
    let transport = worker.transport.clone();
    let source = worker.file("slow.txt", "x");

    let pings = transport.subscribe_broadcast("ping").await.unwrap();
    let clock = FakeClock::new();
    let identity = HostIdentity { name: "edge-1".into(), kind: "transcoder".into() };
    let heartbeat = Heartbeat::new(transport.clone(), clock.clone(), identity, "pong");
    let beat = tokio::spawn(async move { heartbeat.run(pings).await });

    let cmd = Command::new(Operation::Copy, &[arg(&source), arg(&worker.path("slow.copy"))]);
    transport.deliver(WORK_QUEUE, cmd.encode().unwrap());
    transport.broadcast("ping", br#"{"name":"?","ping":"2026-03-14 09:05:07.042"}"#.to_vec());

    let answered = wait_for(200, || transport.published_to("pong").len() == 1).await;
    assert!(answered, "pong should not wait for the copy");
    assert!(transport.acks().is_empty(), "copy should still be sleeping");

    let pong = Machine::decode(&transport.published_to("pong")[0]).unwrap();
    assert_eq!(pong.name, "edge-1");
    assert_eq!(pong.nickname, "edge-1");
    assert_eq!(pong.kind, "transcoder");
    assert_eq!(pong.ping, Timestamp::parse("2026-03-14 09:05:07.042"));
    assert_eq!(pong.pong, Some(clock.timestamp()));

    assert!(wait_for(SPEC_WAIT_MAX_MS, || transport.acks().len() == 1).await);
    beat.abort();
}
