// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command dispatch: one validated job, one handler.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use ferry_adapters::Transport;
use ferry_core::{Command, Job, Operation};
use thiserror::Error;

use crate::error::OpError;
use crate::ops;

/// Default prefix that remove jobs refuse to touch
pub const DEFAULT_PROTECTED_PREFIX: &str = "/root";

/// What to do with a command whose `ops` tag is not recognized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownOpPolicy {
    /// Report `OpError::UnknownOperation`
    #[default]
    Reject,
    /// Log and treat as done
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown policy {0:?} (expected \"reject\" or \"ignore\")")]
pub struct ParsePolicyError(pub String);

impl FromStr for UnknownOpPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(UnknownOpPolicy::Reject),
            "ignore" => Ok(UnknownOpPolicy::Ignore),
            _ => Err(ParsePolicyError(s.to_string())),
        }
    }
}

impl fmt::Display for UnknownOpPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnknownOpPolicy::Reject => f.write_str("reject"),
            UnknownOpPolicy::Ignore => f.write_str("ignore"),
        }
    }
}

/// Dispatcher settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Sleep before each copy so a preceding mkdir can propagate
    pub copy_delay: Duration,
    /// Remove jobs skip paths starting with any of these
    pub protected_prefixes: Vec<String>,
    pub unknown_ops: UnknownOpPolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            copy_delay: Duration::ZERO,
            protected_prefixes: vec![DEFAULT_PROTECTED_PREFIX.to_string()],
            unknown_ops: UnknownOpPolicy::default(),
        }
    }
}

/// How a dispatched command was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// The named handler ran to completion
    Handled(&'static str),
    /// Unknown operation dropped under [`UnknownOpPolicy::Ignore`]
    Ignored,
}

/// Maps commands to operation handlers.
///
/// Exactly one handler runs per call and its error is returned unchanged.
/// Nothing is retried.
#[derive(Clone)]
pub struct Dispatcher<T> {
    transport: T,
    config: DispatchConfig,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T, config: DispatchConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub async fn dispatch(&self, cmd: &Command) -> Result<Dispatched, OpError> {
        if let Operation::Unknown(tag) = &cmd.operation {
            return match self.config.unknown_ops {
                UnknownOpPolicy::Reject => Err(OpError::UnknownOperation(tag.clone())),
                UnknownOpPolicy::Ignore => {
                    tracing::warn!(op = %tag, id = %cmd.id, "ignoring unknown operation");
                    Ok(Dispatched::Ignored)
                }
            };
        }

        let job = Job::from_command(cmd)?;
        tracing::info!(id = %cmd.id, "{}", job);
        let op = job.op();
        match job {
            Job::Copy { source, destination } => self.copy(&source, &destination).await?,
            Job::Move { source, destination } => ops::move_path(&source, &destination).await?,
            Job::Remove { path } => {
                ops::remove_path(&path, &self.config.protected_prefixes).await?;
            }
            Job::MakeDir { path, mode } => ops::make_dir(&path, mode).await?,
            Job::Merge { dir, output } => self.merge(cmd, &dir, output.as_deref()).await?,
        }
        Ok(Dispatched::Handled(op))
    }

    async fn copy(&self, source: &Path, destination: &Path) -> Result<(), OpError> {
        if !self.config.copy_delay.is_zero() {
            tokio::time::sleep(self.config.copy_delay).await;
        }
        let bytes = ops::copy_file(source, destination).await?;
        tracing::debug!(bytes, destination = %destination.display(), "copied");
        Ok(())
    }

    /// Merge, then publish the original command to its completion queue.
    async fn merge(&self, cmd: &Command, dir: &Path, output: Option<&str>) -> Result<(), OpError> {
        let outcome = ops::merge_parts(dir, output).await?;
        tracing::info!(
            id = %cmd.id,
            output = %outcome.output.display(),
            parts = outcome.parts,
            bytes = outcome.bytes,
            "merged"
        );

        if cmd.completion_queue.is_empty() {
            tracing::debug!(id = %cmd.id, "no completion queue, skipping notice");
            return Ok(());
        }
        let body = cmd.encode()?;
        self.transport.publish(&cmd.completion_queue, &body).await?;
        tracing::info!(id = %cmd.id, queue = %cmd.completion_queue, "published completion");
        Ok(())
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
