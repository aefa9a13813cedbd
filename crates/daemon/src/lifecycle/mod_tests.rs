// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::env::Config;
use ferry_adapters::{AmqpEndpoint, FakeTransport};
use ferry_core::{Command, HostIdentity, Machine, Operation};
use ferry_engine::{DispatchConfig, WORK_PREFETCH};
use std::time::Duration;
use tokio::sync::oneshot;

fn config() -> Config {
    Config {
        endpoint: AmqpEndpoint {
            user: "worker".into(),
            password: "secret".into(),
            host: "localhost".into(),
            port: 5672,
        },
        work_queue: "jobs".into(),
        ping_exchange: "ping".into(),
        pong_queue: "pong".into(),
        job_delay: Duration::ZERO,
        identity: HostIdentity { name: "node-7".into(), kind: "storage".into() },
        dispatch: DispatchConfig::default(),
    }
}

async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..500 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}

#[tokio::test]
async fn assemble_subscribes_work_queue_and_ping_exchange() {
    let transport = FakeTransport::new();
    let _worker = assemble(transport.clone(), &config()).await.unwrap();

    assert_eq!(transport.prefetch("jobs"), Some(WORK_PREFETCH));
    assert_eq!(transport.broadcast_subscribers("ping"), 1);
}

#[tokio::test]
async fn assemble_fails_on_dead_connection() {
    let transport = FakeTransport::new();
    transport.close();

    let err = assemble(transport, &config()).await.err().unwrap();
    assert!(matches!(err, LifecycleError::Transport(_)));
}

#[tokio::test]
async fn runs_jobs_and_answers_pings_until_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("a.txt");
    let destination = dir.path().join("b.txt");
    std::fs::write(&source, "hello").unwrap();

    let transport = FakeTransport::new();
    let worker = assemble(transport.clone(), &config()).await.unwrap();
    let (stop, stopped) = oneshot::channel();
    let handle = tokio::spawn(worker.run_until(async move {
        let _ = stopped.await;
        Ok(Shutdown::Terminate)
    }));

    let cmd = Command::new(
        Operation::Copy,
        &[source.to_str().unwrap(), destination.to_str().unwrap()],
    );
    let tag = transport.deliver("jobs", cmd.encode().unwrap());
    transport.broadcast("ping", br#"{"ping":"2026-03-14 09:05:07.042"}"#.to_vec());

    eventually(|| transport.acks() == vec![tag] && transport.published_to("pong").len() == 1)
        .await;
    let _ = stop.send(());
    let outcome = handle.await.unwrap();

    assert_eq!(outcome.unwrap(), Shutdown::Terminate);
    assert_eq!(std::fs::read_to_string(&destination).unwrap(), "hello");
    let pong = Machine::decode(&transport.published_to("pong")[0]).unwrap();
    assert_eq!(pong.name, "node-7");
    assert_eq!(pong.kind, "storage");
}

#[tokio::test]
async fn lost_connection_stops_the_worker_with_an_error() {
    let transport = FakeTransport::new();
    let worker = assemble(transport.clone(), &config()).await.unwrap();
    let handle = tokio::spawn(worker.run_until(std::future::pending()));

    transport.close();
    let err = handle.await.unwrap().unwrap_err();

    assert!(
        matches!(err, LifecycleError::WorkLoop(_) | LifecycleError::Heartbeat(_)),
        "{err}"
    );
}

#[test]
fn shutdown_reason_names_the_signal() {
    assert_eq!(Shutdown::Interrupt.to_string(), "SIGINT");
    assert_eq!(Shutdown::Terminate.to_string(), "SIGTERM");
}
