// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for worker specs.

use std::path::{Path, PathBuf};
pub use std::time::Duration;

pub use ferry_adapters::{FakeTransport, Transport};
pub use ferry_core::{Command, Operation};
pub use ferry_engine::{DispatchConfig, Dispatcher, WorkLoop, WORK_PREFETCH};
pub use serial_test::serial;
use tempfile::TempDir;
use tokio::task::JoinHandle;

pub const WORK_QUEUE: &str = "jobs";

/// Max wait for the worker to catch up
pub const SPEC_WAIT_MAX_MS: u64 = 2000;

/// Poll `check` until it holds or the wait budget runs out.
pub async fn wait_for(max_ms: u64, mut check: impl FnMut() -> bool) -> bool {
    let step = Duration::from_millis(5);
    let mut waited = 0;
    while waited <= max_ms {
        if check() {
            return true;
        }
        tokio::time::sleep(step).await;
        waited += 5;
    }
    false
}

/// A work loop over a fake broker, rooted in a scratch directory
pub struct Worker {
    pub transport: FakeTransport,
    root: TempDir,
    handle: JoinHandle<()>,
    sent: usize,
}

impl Worker {
    pub async fn start() -> Self {
        Self::start_with(DispatchConfig { protected_prefixes: Vec::new(), ..Default::default() })
            .await
    }

    pub async fn start_with(config: DispatchConfig) -> Self {
        let transport = FakeTransport::new();
        let deliveries = transport.consume(WORK_QUEUE, WORK_PREFETCH).await.unwrap();
        let dispatcher = Dispatcher::new(transport.clone(), config);
        let work_loop = WorkLoop::new(transport.clone(), dispatcher, Duration::ZERO);
        let handle = tokio::spawn(async move {
            work_loop.run(deliveries).await;
        });
        Self { transport, root: tempfile::tempdir().unwrap(), handle, sent: 0 }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn file(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Send a command and wait until it has been acknowledged.
    pub async fn run(&mut self, cmd: Command) {
        self.send_raw(cmd.encode().unwrap()).await;
    }

    pub async fn send_raw(&mut self, body: Vec<u8>) {
        self.transport.deliver(WORK_QUEUE, body);
        self.sent += 1;
        let transport = self.transport.clone();
        let sent = self.sent;
        let acked = wait_for(SPEC_WAIT_MAX_MS, || transport.acks().len() >= sent).await;
        assert!(acked, "delivery {} was never acknowledged", sent);
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}
