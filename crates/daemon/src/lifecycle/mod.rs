// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker lifecycle: startup, the two concurrent loops, shutdown.

mod startup;
pub use startup::{assemble, startup};

use std::fmt;
use std::future::Future;

use ferry_adapters::{Subscription, Transport, TransportError};
use ferry_core::SystemClock;
use ferry_engine::{Heartbeat, HeartbeatError, WorkLoop, WorkLoopError};
use thiserror::Error;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};

/// Why the worker stopped cleanly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    Interrupt,
    Terminate,
}

impl fmt::Display for Shutdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shutdown::Interrupt => f.write_str("SIGINT"),
            Shutdown::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Errors that stop the worker
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Work loop stopped: {0}")]
    WorkLoop(#[from] WorkLoopError),

    #[error("Liveness responder stopped: {0}")]
    Heartbeat(#[from] HeartbeatError),

    #[error("Failed to install signal handler: {0}")]
    Signal(#[source] std::io::Error),

    #[error("Task error: {0}")]
    Task(String),
}

/// A connected worker, subscribed and ready to run.
pub struct Worker<T> {
    transport: T,
    work_loop: WorkLoop<T>,
    heartbeat: Heartbeat<T, SystemClock>,
    deliveries: Subscription,
    pings: Subscription,
}

impl<T: Transport> Worker<T> {
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run until SIGINT or SIGTERM, or until either loop fails.
    pub async fn run(self) -> Result<Shutdown, LifecycleError> {
        self.run_until(wait_for_signal()).await
    }

    /// Run both loops until `shutdown` resolves or one of them stops.
    ///
    /// A loop stopping is always an error; neither returns on its own
    /// while the connection is healthy.
    pub async fn run_until<F>(self, shutdown: F) -> Result<Shutdown, LifecycleError>
    where
        F: Future<Output = Result<Shutdown, LifecycleError>>,
    {
        let Worker { work_loop, heartbeat, deliveries, pings, .. } = self;

        let mut work = tokio::spawn(async move { work_loop.run(deliveries).await });
        let mut beat = tokio::spawn(async move { heartbeat.run(pings).await });

        let outcome = tokio::select! {
            joined = &mut work => Err(match joined {
                Ok(e) => LifecycleError::WorkLoop(e),
                Err(e) => LifecycleError::Task(format!("work loop: {e}")),
            }),
            joined = &mut beat => Err(match joined {
                Ok(e) => LifecycleError::Heartbeat(e),
                Err(e) => LifecycleError::Task(format!("liveness responder: {e}")),
            }),
            signalled = shutdown => signalled,
        };

        work.abort();
        beat.abort();
        match &outcome {
            Ok(reason) => info!(%reason, "shutdown requested"),
            Err(e) => warn!(error = %e, "worker stopping"),
        }
        outcome
    }
}

async fn wait_for_signal() -> Result<Shutdown, LifecycleError> {
    let mut terminate = signal(SignalKind::terminate()).map_err(LifecycleError::Signal)?;
    tokio::select! {
        interrupted = tokio::signal::ctrl_c() => {
            interrupted.map_err(LifecycleError::Signal)?;
            Ok(Shutdown::Interrupt)
        }
        _ = terminate.recv() => Ok(Shutdown::Terminate),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
