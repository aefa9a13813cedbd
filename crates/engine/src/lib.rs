// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ferry-engine: job dispatch, filesystem operations, work loop and
//! liveness responder

pub mod dispatch;
pub mod error;
pub mod heartbeat;
pub mod ops;
pub mod work_loop;

pub use dispatch::{
    DispatchConfig, Dispatched, Dispatcher, ParsePolicyError, UnknownOpPolicy,
    DEFAULT_PROTECTED_PREFIX,
};
pub use error::OpError;
pub use heartbeat::{Heartbeat, HeartbeatError, PongError};
pub use work_loop::{WorkLoop, WorkLoopError, WORK_PREFETCH};
