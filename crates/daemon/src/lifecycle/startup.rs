// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connect to the broker and wire up the worker.

use ferry_adapters::{AmqpTransport, Transport};
use ferry_core::SystemClock;
use ferry_engine::{Dispatcher, Heartbeat, WorkLoop, WORK_PREFETCH};
use tracing::info;

use crate::env::Config;

use super::{LifecycleError, Worker};

/// Connect to the broker and subscribe to the work queue and ping exchange.
///
/// Any failure here is fatal; the connection is closed before returning it.
pub async fn startup(config: &Config) -> Result<Worker<AmqpTransport>, LifecycleError> {
    info!(endpoint = %config.endpoint, "connecting to broker");
    let transport = AmqpTransport::connect(&config.endpoint).await?;

    match assemble(transport.clone(), config).await {
        Ok(worker) => Ok(worker),
        Err(e) => {
            transport.close().await;
            Err(e)
        }
    }
}

/// Subscribe and build both loops over an already-connected transport.
pub async fn assemble<T: Transport>(
    transport: T,
    config: &Config,
) -> Result<Worker<T>, LifecycleError> {
    let deliveries = transport.consume(&config.work_queue, WORK_PREFETCH).await?;
    let pings = transport.subscribe_broadcast(&config.ping_exchange).await?;
    info!(
        queue = %config.work_queue,
        ping = %config.ping_exchange,
        pong = %config.pong_queue,
        host = %config.identity.name,
        kind = %config.identity.kind,
        "subscribed"
    );

    let dispatcher = Dispatcher::new(transport.clone(), config.dispatch.clone());
    let work_loop = WorkLoop::new(transport.clone(), dispatcher, config.job_delay);
    let heartbeat = Heartbeat::new(
        transport.clone(),
        SystemClock,
        config.identity.clone(),
        config.pong_queue.clone(),
    );

    Ok(Worker { transport, work_loop, heartbeat, deliveries, pings })
}
