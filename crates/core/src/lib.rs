// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ferry-core: data model for the ferry file-operation worker

pub mod clock;
pub mod command;
pub mod job;
pub mod machine;
pub mod time_fmt;

pub use clock::{Clock, FakeClock, SystemClock};
pub use command::{Command, Operation};
pub use job::{parse_mode, Job, JobError, MAX_MODE};
pub use machine::{HostIdentity, Machine};
pub use time_fmt::{Timestamp, TIMESTAMP_FORMAT};
