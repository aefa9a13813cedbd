// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from broker operations
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    Connect(String),

    #[error("declare {name} failed: {reason}")]
    Declare { name: String, reason: String },

    #[error("consume from {queue} failed: {reason}")]
    Consume { queue: String, reason: String },

    #[error("publish to {queue} failed: {reason}")]
    Publish { queue: String, reason: String },

    #[error("ack of delivery {tag} failed: {reason}")]
    Ack { tag: u64, reason: String },
}

/// One message taken off a queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Broker-assigned tag used to acknowledge this delivery
    pub tag: u64,
    pub body: Vec<u8>,
}

/// Deliveries from a single consumer.
///
/// The stream ends when the consumer is cancelled or the connection closes.
#[derive(Debug)]
pub struct Subscription {
    queue: String,
    rx: mpsc::Receiver<Delivery>,
}

impl Subscription {
    pub fn new(queue: impl Into<String>, rx: mpsc::Receiver<Delivery>) -> Self {
        Self { queue: queue.into(), rx }
    }

    /// Name of the queue being consumed
    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Wait for the next delivery; `None` once the stream has ended.
    pub async fn next(&mut self) -> Option<Delivery> {
        self.rx.recv().await
    }
}

/// Adapter over the message broker.
///
/// Work queues are durable and acknowledged manually; broadcasts are
/// fanout exchanges consumed through a private auto-deleting queue with
/// automatic acknowledgment.
#[async_trait]
pub trait Transport: Clone + Send + Sync + 'static {
    /// Declare `queue` and consume it holding at most `prefetch` unacknowledged deliveries.
    async fn consume(&self, queue: &str, prefetch: u16) -> Result<Subscription, TransportError>;

    /// Declare the fanout `exchange` and receive a copy of everything published to it.
    async fn subscribe_broadcast(&self, exchange: &str) -> Result<Subscription, TransportError>;

    /// Publish `body` point-to-point to `queue`.
    async fn publish(&self, queue: &str, body: &[u8]) -> Result<(), TransportError>;

    /// Acknowledge a delivery taken from [`Transport::consume`].
    async fn ack(&self, tag: u64) -> Result<(), TransportError>;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{Delivery, Subscription, Transport, TransportError};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    const CHANNEL_CAPACITY: usize = 1024;

    /// Recorded publish
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Published {
        pub queue: String,
        pub body: Vec<u8>,
    }

    #[derive(Default)]
    struct FakeTransportState {
        next_tag: u64,
        consumers: HashMap<String, mpsc::Sender<Delivery>>,
        pending: HashMap<String, Vec<Delivery>>,
        prefetch: HashMap<String, u16>,
        broadcasts: HashMap<String, Vec<mpsc::Sender<Delivery>>>,
        published: Vec<Published>,
        acks: Vec<u64>,
        failing_queues: HashSet<String>,
        closed: bool,
    }

    /// In-memory broker for testing
    #[derive(Clone, Default)]
    pub struct FakeTransport {
        inner: Arc<Mutex<FakeTransportState>>,
    }

    impl FakeTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Enqueue a message on a work queue. Returns its delivery tag.
        pub fn deliver(&self, queue: &str, body: impl Into<Vec<u8>>) -> u64 {
            let mut state = self.inner.lock();
            state.next_tag += 1;
            let delivery = Delivery { tag: state.next_tag, body: body.into() };
            let tag = delivery.tag;
            match state.consumers.get(queue) {
                Some(tx) => {
                    let _ = tx.try_send(delivery);
                }
                None => state.pending.entry(queue.to_string()).or_default().push(delivery),
            }
            tag
        }

        /// Fan a message out to every subscriber of `exchange`.
        pub fn broadcast(&self, exchange: &str, body: impl Into<Vec<u8>>) {
            let body = body.into();
            let mut state = self.inner.lock();
            state.next_tag += 1;
            let tag = state.next_tag;
            if let Some(subscribers) = state.broadcasts.get(exchange) {
                for tx in subscribers {
                    let _ = tx.try_send(Delivery { tag, body: body.clone() });
                }
            }
        }

        /// Simulate connection loss: every subscription stream ends.
        pub fn close(&self) {
            let mut state = self.inner.lock();
            state.closed = true;
            state.consumers.clear();
            state.broadcasts.clear();
        }

        /// Make every publish to `queue` fail
        pub fn fail_publish(&self, queue: &str) {
            self.inner.lock().failing_queues.insert(queue.to_string());
        }

        /// All successful publishes, in order
        pub fn published(&self) -> Vec<Published> {
            self.inner.lock().published.clone()
        }

        /// Bodies published to one queue, in order
        pub fn published_to(&self, queue: &str) -> Vec<Vec<u8>> {
            self.inner
                .lock()
                .published
                .iter()
                .filter(|p| p.queue == queue)
                .map(|p| p.body.clone())
                .collect()
        }

        /// Acknowledged delivery tags, in order
        pub fn acks(&self) -> Vec<u64> {
            self.inner.lock().acks.clone()
        }

        /// Prefetch requested when `queue` was consumed
        pub fn prefetch(&self, queue: &str) -> Option<u16> {
            self.inner.lock().prefetch.get(queue).copied()
        }

        /// Number of live subscribers on a broadcast exchange
        pub fn broadcast_subscribers(&self, exchange: &str) -> usize {
            self.inner.lock().broadcasts.get(exchange).map(Vec::len).unwrap_or(0)
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn consume(&self, queue: &str, prefetch: u16) -> Result<Subscription, TransportError> {
            let mut state = self.inner.lock();
            if state.closed {
                return Err(TransportError::Consume {
                    queue: queue.to_string(),
                    reason: "connection closed".to_string(),
                });
            }
            let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
            for delivery in state.pending.remove(queue).unwrap_or_default() {
                let _ = tx.try_send(delivery);
            }
            state.consumers.insert(queue.to_string(), tx);
            state.prefetch.insert(queue.to_string(), prefetch);
            Ok(Subscription::new(queue, rx))
        }

        async fn subscribe_broadcast(&self, exchange: &str) -> Result<Subscription, TransportError> {
            let mut state = self.inner.lock();
            if state.closed {
                return Err(TransportError::Consume {
                    queue: exchange.to_string(),
                    reason: "connection closed".to_string(),
                });
            }
            let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
            state.broadcasts.entry(exchange.to_string()).or_default().push(tx);
            Ok(Subscription::new(format!("{}.fake", exchange), rx))
        }

        async fn publish(&self, queue: &str, body: &[u8]) -> Result<(), TransportError> {
            let mut state = self.inner.lock();
            if state.closed || state.failing_queues.contains(queue) {
                return Err(TransportError::Publish {
                    queue: queue.to_string(),
                    reason: "rejected by fake".to_string(),
                });
            }
            state.published.push(Published { queue: queue.to_string(), body: body.to_vec() });
            Ok(())
        }

        async fn ack(&self, tag: u64) -> Result<(), TransportError> {
            let mut state = self.inner.lock();
            if state.closed {
                return Err(TransportError::Ack { tag, reason: "connection closed".to_string() });
            }
            state.acks.push(tag);
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeTransport, Published};

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
