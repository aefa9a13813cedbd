// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! AMQP 0-9-1 transport over lapin.
//!
//! One connection and one channel are shared by every consumer and
//! publisher; lapin serializes channel frames internally.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicPublishOptions, BasicQosOptions,
    ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::uri::{AMQPAuthority, AMQPUri, AMQPUserInfo};
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, Consumer, ExchangeKind};
use tokio::sync::mpsc;

use crate::transport::{Delivery, Subscription, Transport, TransportError};

/// Deliveries buffered between the lapin consumer and the subscriber
const FORWARD_CAPACITY: usize = 16;

/// Persistent delivery mode for published messages
const PERSISTENT: u8 = 2;

/// Broker location and credentials
#[derive(Clone, PartialEq, Eq)]
pub struct AmqpEndpoint {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
}

impl AmqpEndpoint {
    /// Compose the connection URI without going through string formatting,
    /// so credentials need no escaping.
    pub fn uri(&self) -> AMQPUri {
        AMQPUri {
            authority: AMQPAuthority {
                userinfo: AMQPUserInfo {
                    username: self.user.clone(),
                    password: self.password.clone(),
                },
                host: self.host.clone(),
                port: self.port,
            },
            ..AMQPUri::default()
        }
    }
}

// Keep the password out of logs
impl fmt::Debug for AmqpEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmqpEndpoint")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

impl fmt::Display for AmqpEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "amqp://{}@{}:{}", self.user, self.host, self.port)
    }
}

/// Broker transport backed by a single AMQP connection and channel
#[derive(Clone)]
pub struct AmqpTransport {
    connection: Arc<Connection>,
    channel: Channel,
}

impl AmqpTransport {
    /// Open the connection and its channel.
    pub async fn connect(endpoint: &AmqpEndpoint) -> Result<Self, TransportError> {
        let connection = Connection::connect_uri(endpoint.uri(), ConnectionProperties::default())
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        connection.on_error(|e| {
            tracing::error!(error = %e, "broker connection error");
        });
        let channel = connection
            .create_channel()
            .await
            .map_err(|e| TransportError::Connect(format!("create channel: {}", e)))?;
        tracing::info!(%endpoint, "connected to broker");
        Ok(Self { connection: Arc::new(connection), channel })
    }

    /// Close the connection; open subscriptions end.
    pub async fn close(&self) {
        if let Err(e) = self.connection.close(200, "worker shutting down").await {
            tracing::warn!(error = %e, "failed to close broker connection");
        }
    }

    fn forward(queue: String, mut consumer: Consumer) -> Subscription {
        let (tx, rx) = mpsc::channel(FORWARD_CAPACITY);
        let name = queue.clone();
        tokio::spawn(async move {
            while let Some(item) = consumer.next().await {
                match item {
                    Ok(delivery) => {
                        let delivery = Delivery { tag: delivery.delivery_tag, body: delivery.data };
                        if tx.send(delivery).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(queue = %name, error = %e, "consumer failed");
                        break;
                    }
                }
            }
            tracing::warn!(queue = %name, "consumer stream ended");
        });
        Subscription::new(queue, rx)
    }
}

#[async_trait]
impl Transport for AmqpTransport {
    async fn consume(&self, queue: &str, prefetch: u16) -> Result<Subscription, TransportError> {
        let consume_err =
            |e: lapin::Error| TransportError::Consume { queue: queue.to_string(), reason: e.to_string() };

        self.channel
            .queue_declare(
                queue,
                QueueDeclareOptions { durable: true, ..QueueDeclareOptions::default() },
                FieldTable::default(),
            )
            .await
            .map_err(|e| TransportError::Declare { name: queue.to_string(), reason: e.to_string() })?;
        self.channel
            .basic_qos(prefetch, BasicQosOptions::default())
            .await
            .map_err(consume_err)?;
        let consumer = self
            .channel
            .basic_consume(queue, "", BasicConsumeOptions::default(), FieldTable::default())
            .await
            .map_err(consume_err)?;

        tracing::info!(%queue, prefetch, "consuming work queue");
        Ok(Self::forward(queue.to_string(), consumer))
    }

    async fn subscribe_broadcast(&self, exchange: &str) -> Result<Subscription, TransportError> {
        let declare_err = |name: &str, e: lapin::Error| TransportError::Declare {
            name: name.to_string(),
            reason: e.to_string(),
        };

        self.channel
            .exchange_declare(
                exchange,
                ExchangeKind::Fanout,
                ExchangeDeclareOptions { durable: true, ..ExchangeDeclareOptions::default() },
                FieldTable::default(),
            )
            .await
            .map_err(|e| declare_err(exchange, e))?;

        // Server-named, private to this connection, gone when we disconnect
        let queue = self
            .channel
            .queue_declare(
                "",
                QueueDeclareOptions {
                    exclusive: true,
                    auto_delete: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| declare_err("<anonymous>", e))?;
        let queue_name = queue.name().as_str().to_string();

        self.channel
            .queue_bind(&queue_name, exchange, "", QueueBindOptions::default(), FieldTable::default())
            .await
            .map_err(|e| declare_err(&queue_name, e))?;
        let consumer = self
            .channel
            .basic_consume(
                &queue_name,
                "",
                BasicConsumeOptions { no_ack: true, ..BasicConsumeOptions::default() },
                FieldTable::default(),
            )
            .await
            .map_err(|e| TransportError::Consume {
                queue: queue_name.clone(),
                reason: e.to_string(),
            })?;

        tracing::info!(%exchange, queue = %queue_name, "subscribed to broadcast");
        Ok(Self::forward(queue_name, consumer))
    }

    async fn publish(&self, queue: &str, body: &[u8]) -> Result<(), TransportError> {
        let properties = BasicProperties::default()
            .with_content_type("application/json".into())
            .with_delivery_mode(PERSISTENT);
        self.channel
            .basic_publish("", queue, BasicPublishOptions::default(), body, properties)
            .await
            .map_err(|e| TransportError::Publish { queue: queue.to_string(), reason: e.to_string() })?;
        Ok(())
    }

    async fn ack(&self, tag: u64) -> Result<(), TransportError> {
        self.channel
            .basic_ack(tag, BasicAckOptions::default())
            .await
            .map_err(|e| TransportError::Ack { tag, reason: e.to_string() })
    }
}

#[cfg(test)]
#[path = "amqp_tests.rs"]
mod tests;
