// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io;
use std::path::{Path, PathBuf};

use ferry_adapters::TransportError;
use ferry_core::JobError;
use thiserror::Error;

/// Errors from dispatching or executing a single job
#[derive(Debug, Error)]
pub enum OpError {
    #[error("unknown operation {0:?}")]
    UnknownOperation(String),

    #[error("invalid arguments: {0}")]
    InvalidArgs(#[from] JobError),

    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a regular file", .0.display())]
    NotRegularFile(PathBuf),

    #[error("{} and {} are the same file", .original.display(), .destination.display())]
    SameFile { original: PathBuf, destination: PathBuf },

    #[error("{}: no files to merge", .0.display())]
    NothingToMerge(PathBuf),

    #[error("cannot derive merge output name from {}", .0.display())]
    NoOutputName(PathBuf),

    #[error("failed to encode completion notice: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to publish completion notice: {0}")]
    Completion(#[from] TransportError),

    #[error("blocking task failed: {0}")]
    Task(String),
}

impl OpError {
    /// Build a mapper from `io::Error` for use with `map_err`.
    pub(crate) fn io<'a>(
        action: &'static str,
        path: &'a Path,
    ) -> impl FnOnce(io::Error) -> OpError + 'a {
        move |source| OpError::Io { action, path: path.to_path_buf(), source }
    }
}
