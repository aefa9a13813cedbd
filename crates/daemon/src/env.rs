// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ferry_adapters::AmqpEndpoint;
use ferry_core::HostIdentity;
use ferry_engine::{DispatchConfig, UnknownOpPolicy, DEFAULT_PROTECTED_PREFIX};
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 5672;

/// Configuration errors; all are fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid {name}={value:?}: {reason}")]
    Invalid { name: &'static str, value: String, reason: String },

    #[error("failed to load .env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}

/// Worker configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: AmqpEndpoint,
    /// Durable queue jobs are consumed from (RABBIT_QUEUE)
    pub work_queue: String,
    /// Fanout exchange pings arrive on (RABBIT_PING)
    pub ping_exchange: String,
    /// Queue pongs are published to (RABBIT_PONG)
    pub pong_queue: String,
    /// Sleep after each job (WAIT_TIME, milliseconds)
    pub job_delay: Duration,
    /// HOST_NAME / HOST_TYPE
    pub identity: HostIdentity,
    pub dispatch: DispatchConfig,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars { lookup: &lookup };

        let endpoint = AmqpEndpoint {
            user: vars.required("RABBIT_USER")?,
            password: vars.required("RABBIT_PASSWORD")?,
            host: vars.required("RABBIT_HOST")?,
            port: vars.parsed("RABBIT_PORT")?.unwrap_or(DEFAULT_PORT),
        };

        let protected_prefixes = match vars.optional("FERRY_PROTECTED_PREFIXES") {
            Some(list) => {
                list.split(',').map(str::trim).filter(|p| !p.is_empty()).map(String::from).collect()
            }
            None => vec![DEFAULT_PROTECTED_PREFIX.to_string()],
        };
        let dispatch = DispatchConfig {
            copy_delay: Duration::from_secs(vars.parsed("CP_SLEEP")?.unwrap_or(0)),
            protected_prefixes,
            unknown_ops: vars.parsed::<UnknownOpPolicy>("FERRY_UNKNOWN_OPS")?.unwrap_or_default(),
        };

        Ok(Self {
            endpoint,
            work_queue: vars.required("RABBIT_QUEUE")?,
            ping_exchange: vars.required("RABBIT_PING")?,
            pong_queue: vars.required("RABBIT_PONG")?,
            job_delay: Duration::from_millis(vars.parsed("WAIT_TIME")?.unwrap_or(0)),
            identity: HostIdentity {
                name: vars.required("HOST_NAME")?,
                kind: vars.required("HOST_TYPE")?,
            },
            dispatch,
        })
    }
}

struct Vars<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl Vars<'_> {
    fn optional(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn parsed<T>(&self, name: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(name)
            .map(|value| {
                value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                    name,
                    reason: e.to_string(),
                    value,
                })
            })
            .transpose()
    }
}

/// Load `.env` from the working directory (or a parent) if there is one.
/// Variables already set in the environment win.
pub fn load_env_file() -> Result<Option<PathBuf>, ConfigError> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
