// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work-queue command: the job descriptor as it travels on the wire.
//!
//! Wire format: a JSON object
//! `{"ops": "merge", "args": ["/tmp/parts", "out.zip"], "id": "12345", "done": "merge-done"}`.
//! Every field is optional on decode.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Filesystem operation named by a command's `ops` tag.
///
/// Unrecognized tags are kept verbatim in `Unknown` so a command re-encodes
/// exactly as it arrived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operation {
    Copy,
    Move,
    Remove,
    MakeDir,
    Merge,
    Unknown(String),
}

impl Operation {
    /// Wire tag for this operation
    pub fn tag(&self) -> &str {
        match self {
            Operation::Unknown(tag) => tag,
            known => known.known_tag().unwrap_or_default(),
        }
    }

    /// Wire tag of a recognized operation; `None` for `Unknown`
    pub fn known_tag(&self) -> Option<&'static str> {
        match self {
            Operation::Copy => Some("cp"),
            Operation::Move => Some("mv"),
            Operation::Remove => Some("rm"),
            Operation::MakeDir => Some("mkdir"),
            Operation::Merge => Some("merge"),
            Operation::Unknown(_) => None,
        }
    }
}

impl Default for Operation {
    fn default() -> Self {
        Operation::Unknown(String::new())
    }
}

impl From<String> for Operation {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "cp" => Operation::Copy,
            "mv" => Operation::Move,
            "rm" => Operation::Remove,
            "mkdir" => Operation::MakeDir,
            "merge" => Operation::Merge,
            _ => Operation::Unknown(tag),
        }
    }
}

impl From<&str> for Operation {
    fn from(tag: &str) -> Self {
        Operation::from(tag.to_string())
    }
}

impl From<Operation> for String {
    fn from(op: Operation) -> Self {
        match op {
            Operation::Unknown(tag) => tag,
            known => known.tag().to_string(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A job descriptor decoded from one work-queue delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Command {
    #[serde(rename = "ops")]
    pub operation: Operation,
    pub args: Vec<String>,
    /// Opaque identifier correlating the job with external tracking
    pub id: String,
    /// Queue to publish a completion notice to (merge only)
    #[serde(rename = "done")]
    pub completion_queue: String,
}

impl Command {
    pub fn new(operation: impl Into<Operation>, args: &[&str]) -> Self {
        Self {
            operation: operation.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_completion_queue(mut self, queue: impl Into<String>) -> Self {
        self.completion_queue = queue.into();
        self
    }

    /// Decode a command from a delivery body.
    pub fn decode(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Encode the command for publishing.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
