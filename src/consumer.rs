use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::Message;
use tokio::sync::watch;
use tokio::time::sleep;

use crate::configure::KafkaConfig;
use crate::db::OrderStore;
use crate::models::Order;

const LOG_TARGET: &str = "ingest";

/// What happened to one delivered payload. Every variant is terminal for
/// that payload: nothing is retried, the worker moves on regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Decoded and persisted.
    Stored,
    /// Undecodable payload, dropped (poison message).
    Malformed,
    /// Decoded but the store insert failed; the event is lost for this run.
    StoreFailed,
}

/// Process one delivered payload: decode, persist, log the outcome.
///
/// Failures never propagate past the single message: a malformed payload
/// or a store error is logged and absorbed so the consuming loop stays
/// live against an unbounded sequence of bad messages.
pub async fn process_payload(store: &dyn OrderStore, payload: &[u8]) -> IngestOutcome {
    let order = match serde_json::from_slice::<Order>(payload) {
        Ok(order) => order,
        Err(e) => {
            log::warn!(
                target: LOG_TARGET,
                "Dropping undecodable message: {} | Payload: {}",
                e,
                String::from_utf8_lossy(payload)
            );
            return IngestOutcome::Malformed;
        }
    };

    match store.insert_order(order.clone()).await {
        Ok(()) => {
            log::info!(
                target: LOG_TARGET,
                "Stored order {}: {} {} {}@{}",
                order.order_id,
                order.side,
                order.symbol,
                order.amount,
                order.price
            );
            IngestOutcome::Stored
        }
        Err(e) => {
            log::error!(
                target: LOG_TARGET,
                "Failed to store order {}: {:#}",
                order.order_id,
                e
            );
            IngestOutcome::StoreFailed
        }
    }
}

/// Long-lived Kafka consumer that drains the orders topic into the store.
///
/// One worker owns one consumer-group member; partition assignment (and
/// with it the number of concurrently consuming processes) is the
/// broker's business. Consumption progress is tracked by the group's
/// auto-committed offsets.
pub struct IngestWorker {
    consumer: StreamConsumer,
    store: Arc<dyn OrderStore>,
    shutdown: watch::Receiver<bool>,
    topic: String,
}

impl IngestWorker {
    /// Create the consumer and subscribe. Failing here is fatal for the
    /// service: without the broker there is no work to do.
    pub fn connect(
        config: &KafkaConfig,
        store: Arc<dyn OrderStore>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.broker)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "true")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", &config.session_timeout_ms)
            .set("heartbeat.interval.ms", &config.heartbeat_interval_ms)
            .set("socket.keepalive.enable", &config.socket_keepalive_enable)
            .create()
            .context("Failed to create Kafka consumer")?;

        consumer
            .subscribe(&[&config.topic])
            .context("Failed to subscribe to orders topic")?;

        Ok(Self {
            consumer,
            store,
            shutdown,
            topic: config.topic.clone(),
        })
    }

    /// Consume until the shutdown signal flips. A message already pulled
    /// from the broker is processed to completion before the signal is
    /// checked again, so nothing fetched is dropped silently on exit.
    pub async fn run(mut self) {
        log::info!(target: LOG_TARGET, "Consuming from topic '{}'", self.topic);

        loop {
            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
                received = self.consumer.recv() => match received {
                    Ok(message) => match message.payload() {
                        Some(payload) => {
                            process_payload(self.store.as_ref(), payload).await;
                        }
                        None => log::warn!(target: LOG_TARGET, "Skipping message with empty payload"),
                    },
                    Err(KafkaError::MessageConsumption(RDKafkaErrorCode::UnknownTopicOrPartition)) => {
                        log::warn!(
                            target: LOG_TARGET,
                            "Topic '{}' not found yet. Waiting for orders...",
                            self.topic
                        );
                        sleep(Duration::from_secs(2)).await;
                    }
                    Err(e) => {
                        log::error!(target: LOG_TARGET, "Kafka error: {}", e);
                        sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        }

        log::info!(target: LOG_TARGET, "Ingest worker shutting down");
    }
}
