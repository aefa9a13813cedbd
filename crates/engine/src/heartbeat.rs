// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Liveness responder: answers ping broadcasts with identity-stamped pongs.
//!
//! Runs beside the work loop and shares nothing with it but the transport.
//! Pings are auto-acknowledged, so a ping that fails to produce a pong is
//! simply dropped.

use ferry_adapters::{Subscription, Transport, TransportError};
use ferry_core::{Clock, HostIdentity, Machine};
use thiserror::Error;

/// Failure to answer one ping
#[derive(Debug, Error)]
pub enum PongError {
    #[error("failed to encode pong: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Publish(#[from] TransportError),
}

/// The ping stream ended; fatal for the worker
#[derive(Debug, Error)]
#[error("ping stream {0} ended")]
pub struct HeartbeatError(pub String);

pub struct Heartbeat<T, C> {
    transport: T,
    clock: C,
    identity: HostIdentity,
    pong_queue: String,
}

impl<T: Transport, C: Clock> Heartbeat<T, C> {
    pub fn new(transport: T, clock: C, identity: HostIdentity, pong_queue: impl Into<String>) -> Self {
        Self { transport, clock, identity, pong_queue: pong_queue.into() }
    }

    /// Answer pings until the stream ends.
    pub async fn run(&self, mut pings: Subscription) -> HeartbeatError {
        tracing::info!(queue = %pings.queue(), pong = %self.pong_queue, "answering pings");
        while let Some(ping) = pings.next().await {
            if let Err(e) = self.respond(&ping.body).await {
                tracing::warn!(error = %e, "skipped ping");
            }
        }
        HeartbeatError(pings.queue().to_string())
    }

    /// Build and publish the pong for one ping payload.
    pub async fn respond(&self, ping: &[u8]) -> Result<Machine, PongError> {
        tracing::debug!(body = %String::from_utf8_lossy(ping), "received ping");
        let machine = self.pong(ping);
        let body = machine.encode()?;
        self.transport.publish(&self.pong_queue, &body).await?;
        tracing::debug!(body = %String::from_utf8_lossy(&body), "sent pong");
        Ok(machine)
    }

    /// Decode a ping (falling back to an empty record) and stamp it.
    pub fn pong(&self, ping: &[u8]) -> Machine {
        let mut machine = Machine::decode(ping).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "undecodable ping, answering with defaults");
            Machine::default()
        });
        machine.stamp(&self.identity, self.clock.timestamp());
        machine
    }
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
