// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ferry-adapters: message broker access for the ferry worker

pub mod amqp;
pub mod transport;

pub use amqp::{AmqpEndpoint, AmqpTransport};
pub use transport::{Delivery, Subscription, Transport, TransportError};

#[cfg(any(test, feature = "test-support"))]
pub use transport::{FakeTransport, Published};
