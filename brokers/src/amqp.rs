//! AMQP 0-9-1 broker client on top of lapin

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, ConfirmSelectOptions, QueueDeclareOptions};
use lapin::publisher_confirm::{Confirmation as LapinConfirmation, PublisherConfirm};
use lapin::types::{AMQPValue, FieldTable, LongString, ShortString};
use lapin::uri::AMQPUri;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use tokio::sync::mpsc;

use mqbench_core::ack::confirm_channel;
use mqbench_core::traits::{
    BrokerChannel, BrokerConnection, BrokerConnector, BrokerError, Confirmation, QueueSpec,
};
use mqbench_core::{DialConfig, PublishMessage};

/// Reply code sent when closing a connection
const REPLY_SUCCESS: u16 = 200;

/// Dials AMQP brokers (`amqp://` and `amqps://` URIs)
#[derive(Debug, Clone, Default)]
pub struct AmqpConnector;

impl AmqpConnector {
    /// Create a connector
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BrokerConnector for AmqpConnector {
    fn broker_name(&self) -> &str {
        "amqp"
    }

    async fn connect(
        &self,
        target: &str,
        dial: &DialConfig,
    ) -> Result<Box<dyn BrokerConnection>, BrokerError> {
        let uri = dial_uri(target, dial)?;

        let connection =
            tokio::time::timeout(dial.connect_timeout, Connection::connect_uri(uri, properties()))
                .await
                .map_err(|_| BrokerError::Timeout(dial.connect_timeout))?
                .map_err(|e| BrokerError::Connect(e.to_string()))?;

        tracing::trace!(addr = %redact(target), "AMQP connection open");
        Ok(Box::new(AmqpConnection { connection }))
    }
}

/// Parse `target` and apply the heartbeat
fn dial_uri(target: &str, dial: &DialConfig) -> Result<AMQPUri, BrokerError> {
    let mut uri: AMQPUri = target
        .parse()
        .map_err(|e: String| BrokerError::Connect(format!("invalid AMQP URI: {e}")))?;
    uri.query.heartbeat = Some(heartbeat_secs(dial.heartbeat));
    Ok(uri)
}

/// Heartbeat in whole seconds, as negotiated by AMQP
fn heartbeat_secs(heartbeat: Duration) -> u16 {
    u16::try_from(heartbeat.as_secs()).unwrap_or(u16::MAX)
}

fn properties() -> ConnectionProperties {
    ConnectionProperties::default()
        .with_executor(tokio_executor_trait::Tokio::current())
        .with_reactor(tokio_reactor_trait::Tokio)
}

/// Strip credentials from a URI before logging it
fn redact(target: &str) -> String {
    match (target.find("://"), target.rfind('@')) {
        (Some(scheme), Some(at)) if at > scheme => {
            format!("{}://***@{}", &target[..scheme], &target[at + 1..])
        }
        _ => target.to_string(),
    }
}

// ============================================================================
// Connection
// ============================================================================

struct AmqpConnection {
    connection: Connection,
}

#[async_trait]
impl BrokerConnection for AmqpConnection {
    async fn open_channel(&self) -> Result<Box<dyn BrokerChannel>, BrokerError> {
        let channel = self
            .connection
            .create_channel()
            .await
            .map_err(|e| BrokerError::Channel(e.to_string()))?;

        Ok(Box::new(AmqpChannel {
            channel,
            next_tag: AtomicU64::new(1),
            pending: OnceLock::new(),
        }))
    }

    async fn close(&self) -> Result<(), BrokerError> {
        if !self.connection.status().connected() {
            return Err(BrokerError::Closed);
        }
        self.connection
            .close(REPLY_SUCCESS, "OK")
            .await
            .map_err(|e| BrokerError::Connect(e.to_string()))
    }
}

// ============================================================================
// Channel
// ============================================================================

type PendingConfirm = (u64, PublisherConfirm);

struct AmqpChannel {
    channel: Channel,
    /// Delivery tag of the next publish in confirm mode
    next_tag: AtomicU64,
    /// Set once confirms are enabled
    pending: OnceLock<mpsc::UnboundedSender<PendingConfirm>>,
}

#[async_trait]
impl BrokerChannel for AmqpChannel {
    async fn enable_confirms(&self) -> Result<mpsc::Receiver<Confirmation>, BrokerError> {
        self.channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(|e| {
                if channel_lost(&e) {
                    BrokerError::Channel(e.to_string())
                } else {
                    BrokerError::Confirms(e.to_string())
                }
            })?;

        let (pending_tx, pending_rx) = mpsc::unbounded_channel();
        let (confirms_tx, confirms_rx) = confirm_channel();
        tokio::spawn(forward_confirms(pending_rx, confirms_tx));

        if self.pending.set(pending_tx).is_err() {
            return Err(BrokerError::Confirms("already enabled".into()));
        }
        Ok(confirms_rx)
    }

    async fn declare_queue(&self, spec: &QueueSpec) -> Result<String, BrokerError> {
        let queue = self
            .channel
            .queue_declare(&spec.name, declare_options(spec), FieldTable::default())
            .await
            .map_err(|e| BrokerError::Declare(e.to_string()))?;

        Ok(queue.name().as_str().to_string())
    }

    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        message: &PublishMessage,
    ) -> Result<(), BrokerError> {
        let confirm = self
            .channel
            .basic_publish(
                exchange,
                routing_key,
                BasicPublishOptions {
                    mandatory: false,
                    immediate: false,
                },
                &message.body,
                message_properties(message),
            )
            .await
            .map_err(|e| BrokerError::Publish(e.to_string()))?;

        if let Some(pending) = self.pending.get() {
            let tag = self.next_tag.fetch_add(1, Ordering::Relaxed);
            // The forwarder only stops once this channel is dropped.
            let _ = pending.send((tag, confirm));
        }
        Ok(())
    }
}

fn declare_options(spec: &QueueSpec) -> QueueDeclareOptions {
    QueueDeclareOptions {
        passive: false,
        durable: spec.durable,
        exclusive: spec.exclusive,
        auto_delete: spec.auto_delete,
        nowait: false,
    }
}

/// Channel or connection already gone, as opposed to confirms being refused
fn channel_lost(error: &lapin::Error) -> bool {
    matches!(
        error,
        lapin::Error::InvalidChannelState(_) | lapin::Error::InvalidConnectionState(_)
    )
}

fn message_properties(message: &PublishMessage) -> BasicProperties {
    let mut properties = BasicProperties::default();

    if let Some(content_type) = &message.content_type {
        properties = properties.with_content_type(ShortString::from(content_type.clone()));
    }

    if !message.headers.is_empty() {
        let mut headers = FieldTable::default();
        for (name, value) in &message.headers {
            headers.insert(
                ShortString::from(name.clone()),
                AMQPValue::LongString(LongString::from(value.clone())),
            );
        }
        properties = properties.with_headers(headers);
    }

    properties
}

/// Resolve publisher confirms in publish order and report them
async fn forward_confirms(
    mut pending: mpsc::UnboundedReceiver<PendingConfirm>,
    confirms: mpsc::Sender<Confirmation>,
) {
    while let Some((tag, confirm)) = pending.recv().await {
        let confirmation = match confirm.await {
            Ok(LapinConfirmation::Ack(_)) => Confirmation::ack(tag),
            Ok(LapinConfirmation::Nack(_)) => Confirmation::nack(tag),
            Ok(LapinConfirmation::NotRequested) => continue,
            Err(e) => {
                tracing::debug!(delivery_tag = tag, error = %e, "Confirmation lost");
                break;
            }
        };

        if confirms.send(confirmation).await.is_err() {
            break;
        }
    }
}
