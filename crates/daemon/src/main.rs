// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ferryd: file operation worker
//!
//! Consumes file jobs from a RabbitMQ work queue and answers liveness pings
//! until signalled or until the broker connection fails.

mod env;
mod lifecycle;
mod logging;

use std::process::ExitCode;

use tracing::{error, info};

use crate::env::Config;

#[tokio::main]
async fn main() -> ExitCode {
    // Before logging so .env can set FERRY_LOG
    let env_file = env::load_env_file();
    let _log_guard = logging::init();

    match env_file {
        Ok(Some(path)) => info!(path = %path.display(), "loaded environment file"),
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "startup failed");
            return ExitCode::FAILURE;
        }
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "startup failed");
            return ExitCode::FAILURE;
        }
    };
    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.identity.name,
        kind = %config.identity.kind,
        "starting ferryd"
    );

    let worker = match lifecycle::startup(&config).await {
        Ok(worker) => worker,
        Err(e) => {
            error!(error = %e, "startup failed");
            return ExitCode::FAILURE;
        }
    };
    let transport = worker.transport().clone();

    match worker.run().await {
        Ok(_) => {
            transport.close().await;
            info!("stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "worker stopped");
            ExitCode::FAILURE
        }
    }
}
