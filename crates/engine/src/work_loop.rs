// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work loop: one delivery at a time from the work queue to acknowledgment.
//!
//! Every delivery is acknowledged exactly once after dispatch returns,
//! whatever the outcome, so a failed job is never redelivered
//! (at-most-once). Throughput is bounded by prefetch 1 plus a fixed
//! sleep after each job.

use std::time::{Duration, Instant};

use ferry_adapters::{Delivery, Subscription, Transport, TransportError};
use ferry_core::Command;
use thiserror::Error;

use crate::dispatch::{Dispatched, Dispatcher};

/// Unacknowledged deliveries the work queue consumer may hold
pub const WORK_PREFETCH: u16 = 1;

/// Reasons the work loop stops. All of them are fatal for the worker.
#[derive(Debug, Error)]
pub enum WorkLoopError {
    #[error("work queue {0} stream ended")]
    StreamEnded(String),

    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),
}

pub struct WorkLoop<T> {
    transport: T,
    dispatcher: Dispatcher<T>,
    job_delay: Duration,
}

impl<T: Transport> WorkLoop<T> {
    pub fn new(transport: T, dispatcher: Dispatcher<T>, job_delay: Duration) -> Self {
        Self { transport, dispatcher, job_delay }
    }

    /// Process deliveries until the stream ends or an acknowledgment fails.
    ///
    /// Only returns on failure.
    pub async fn run(&self, mut deliveries: Subscription) -> WorkLoopError {
        tracing::info!(queue = %deliveries.queue(), "waiting for messages");
        while let Some(delivery) = deliveries.next().await {
            if let Err(e) = self.process(delivery).await {
                return e.into();
            }
            if !self.job_delay.is_zero() {
                tokio::time::sleep(self.job_delay).await;
            }
        }
        WorkLoopError::StreamEnded(deliveries.queue().to_string())
    }

    /// Decode, dispatch and acknowledge one delivery.
    ///
    /// Job failures are logged here; only the acknowledgment can fail.
    pub async fn process(&self, delivery: Delivery) -> Result<(), TransportError> {
        let start = Instant::now();
        tracing::debug!(
            tag = delivery.tag,
            body = %String::from_utf8_lossy(&delivery.body),
            "received message"
        );

        let cmd = Command::decode(&delivery.body).unwrap_or_else(|e| {
            tracing::warn!(tag = delivery.tag, error = %e, "undecodable command, using defaults");
            Command::default()
        });

        let result = self.dispatcher.dispatch(&cmd).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match result {
            Ok(Dispatched::Handled(op)) => {
                tracing::info!(id = %cmd.id, op, elapsed_ms, "done");
            }
            Ok(Dispatched::Ignored) => {
                tracing::info!(id = %cmd.id, op = %cmd.operation, elapsed_ms, "ignored");
            }
            Err(e) => {
                tracing::error!(id = %cmd.id, op = %cmd.operation, error = %e, elapsed_ms, "job failed");
            }
        }

        self.transport.ack(delivery.tag).await
    }
}

#[cfg(test)]
#[path = "work_loop_tests.rs"]
mod tests;
