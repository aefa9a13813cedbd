// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validated, typed form of a [`Command`].

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::command::{Command, Operation};

/// Highest permission value accepted for `mkdir` (setuid/setgid/sticky + rwx)
pub const MAX_MODE: u32 = 0o7777;

/// Errors from turning a command's positional arguments into a [`Job`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("unknown operation {0:?}")]
    UnknownOperation(String),

    #[error("{op}: missing argument {index} <{name}>")]
    MissingArg { op: &'static str, index: usize, name: &'static str },

    #[error("{op}: argument {index} <{name}> is empty")]
    EmptyArg { op: &'static str, index: usize, name: &'static str },

    #[error("invalid mode {0:?}: expected octal permission bits up to 7777")]
    InvalidMode(String),

    #[error("invalid merge output name {0:?}: must be a plain file name")]
    InvalidOutputName(String),
}

/// A filesystem job with its arguments checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    Copy { source: PathBuf, destination: PathBuf },
    Move { source: PathBuf, destination: PathBuf },
    Remove { path: PathBuf },
    MakeDir { path: PathBuf, mode: u32 },
    /// `output: None` means derive the name from the first part
    Merge { dir: PathBuf, output: Option<String> },
}

impl Job {
    /// Validate a command's arguments for its operation.
    ///
    /// Extra trailing arguments are ignored.
    pub fn from_command(cmd: &Command) -> Result<Self, JobError> {
        let Some(op) = cmd.operation.known_tag() else {
            return Err(JobError::UnknownOperation(cmd.operation.tag().to_string()));
        };
        let args = Args { op, values: &cmd.args };
        match &cmd.operation {
            Operation::Copy => Ok(Job::Copy {
                source: args.path(0, "source")?,
                destination: args.path(1, "destination")?,
            }),
            Operation::Move => Ok(Job::Move {
                source: args.path(0, "source")?,
                destination: args.path(1, "destination")?,
            }),
            Operation::Remove => Ok(Job::Remove { path: args.path(0, "path")? }),
            Operation::MakeDir => Ok(Job::MakeDir {
                path: args.path(0, "path")?,
                mode: parse_mode(args.required(1, "mode")?)?,
            }),
            Operation::Merge => {
                let dir = args.path(0, "directory")?;
                let output = match args.values.get(1).map(String::as_str) {
                    None | Some("") => None,
                    Some(name) => Some(validate_output_name(name)?),
                };
                Ok(Job::Merge { dir, output })
            }
            Operation::Unknown(tag) => Err(JobError::UnknownOperation(tag.clone())),
        }
    }

    /// Wire tag of the operation this job performs
    pub fn op(&self) -> &'static str {
        match self {
            Job::Copy { .. } => "cp",
            Job::Move { .. } => "mv",
            Job::Remove { .. } => "rm",
            Job::MakeDir { .. } => "mkdir",
            Job::Merge { .. } => "merge",
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::Copy { source, destination } => {
                write!(f, "copy {} to {}", source.display(), destination.display())
            }
            Job::Move { source, destination } => {
                write!(f, "move {} to {}", source.display(), destination.display())
            }
            Job::Remove { path } => write!(f, "remove {}", path.display()),
            Job::MakeDir { path, mode } => write!(f, "mkdir {} ({:04o})", path.display(), mode),
            Job::Merge { dir, output: Some(name) } => {
                write!(f, "merge {} into {}", dir.display(), name)
            }
            Job::Merge { dir, output: None } => write!(f, "merge {}", dir.display()),
        }
    }
}

struct Args<'a> {
    op: &'static str,
    values: &'a [String],
}

impl<'a> Args<'a> {
    fn required(&self, index: usize, name: &'static str) -> Result<&'a str, JobError> {
        let value = self
            .values
            .get(index)
            .ok_or(JobError::MissingArg { op: self.op, index, name })?;
        if value.is_empty() {
            return Err(JobError::EmptyArg { op: self.op, index, name });
        }
        Ok(value)
    }

    fn path(&self, index: usize, name: &'static str) -> Result<PathBuf, JobError> {
        self.required(index, name).map(PathBuf::from)
    }
}

/// Parse an octal permission string: `0755`, `755` and `0o755` all mean 0o755.
pub fn parse_mode(value: &str) -> Result<u32, JobError> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("0o")
        .or_else(|| trimmed.strip_prefix("0O"))
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(JobError::InvalidMode(value.to_string()));
    }
    match u32::from_str_radix(digits, 8) {
        Ok(mode) if mode <= MAX_MODE => Ok(mode),
        _ => Err(JobError::InvalidMode(value.to_string())),
    }
}

fn validate_output_name(name: &str) -> Result<String, JobError> {
    let plain = Path::new(name).file_name().map(|n| n == name).unwrap_or(false);
    if !plain || name.contains('\0') {
        return Err(JobError::InvalidOutputName(name.to_string()));
    }
    Ok(name.to_string())
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
