// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup.

use std::io::IsTerminal;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Level applied to the worker's own crates
pub const LOG_ENV_VAR: &str = "FERRY_LOG";

const DEFAULT_LEVEL: &str = "info";

const FERRY_CRATES: &[&str] = &["ferry_adapters", "ferry_core", "ferry_engine", "ferryd"];

/// Install the global subscriber writing to stderr.
///
/// The returned guard flushes buffered lines when dropped; hold it for the
/// life of the process.
pub fn init() -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    let (filter, level) = env_filter(
        std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(),
        std::env::var(LOG_ENV_VAR).ok().as_deref(),
    );

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();

    tracing::info!("log level: {}", level);
    guard
}

/// Build the filter: RUST_LOG directives first, then `level` for every
/// worker crate RUST_LOG does not already mention. Unparseable input falls
/// back to defaults.
pub(crate) fn env_filter(rust_log: Option<&str>, level: Option<&str>) -> (EnvFilter, String) {
    let directives = rust_log.unwrap_or_default();
    let mut filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(directives);

    let level = match level.map(str::trim) {
        Some(l) if l.parse::<LevelFilter>().is_ok() => l.to_ascii_lowercase(),
        _ => DEFAULT_LEVEL.to_string(),
    };

    for name in FERRY_CRATES {
        if directives.contains(&format!("{name}=")) {
            continue;
        }
        if let Ok(directive) = format!("{name}={level}").parse() {
            filter = filter.add_directive(directive);
        }
    }
    (filter, level)
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
