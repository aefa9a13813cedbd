// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Liveness record exchanged between pingers and workers.

use serde::{Deserialize, Serialize};

use crate::time_fmt::Timestamp;

/// Identity a worker stamps onto every pong
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity {
    pub name: String,
    /// Free-form role of the machine (e.g. "worker", "gpu")
    pub kind: String,
}

/// Ping/pong payload. A ping carries at least `ping`; the pong is the same
/// record with identity and `pong` filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Machine {
    pub name: String,
    pub nickname: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub ping: Option<Timestamp>,
    pub pong: Option<Timestamp>,
}

impl Machine {
    pub fn decode(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Fill in the responder's identity and pong time.
    pub fn stamp(&mut self, identity: &HostIdentity, pong: Timestamp) {
        self.name = identity.name.clone();
        self.nickname = identity.name.clone();
        self.kind = identity.kind.clone();
        self.pong = Some(pong);
    }
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;
