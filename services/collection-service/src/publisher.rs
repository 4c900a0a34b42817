use async_trait::async_trait;
use rdkafka::{
    config::ClientConfig,
    producer::{FutureProducer, FutureRecord, Producer},
    util::Timeout,
};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::KafkaConfig;
use crate::error::PublishError;
use crate::message::OutboundMessage;

/// Broker placement of an acknowledged record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub partition: i32,
    pub offset: i64,
}

/// Publishes one record and resolves only once the broker has acknowledged it.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, message: &OutboundMessage) -> Result<Delivery, PublishError>;
}

/// Kafka-backed publisher. The producer is thread-safe and shared by every request.
#[derive(Clone)]
pub struct KafkaPublisher {
    producer: FutureProducer,
    topic: String,
    queue_timeout: Duration,
}

impl KafkaPublisher {
    /// Create the producer and confirm the brokers answer a metadata request for the topic.
    ///
    /// Blocks for up to `connect_timeout`; call it off the async executor.
    pub fn connect(config: &KafkaConfig) -> Result<Self, PublishError> {
        info!(
            brokers = %config.brokers,
            topic = %config.topic,
            acks = %config.acks,
            "initializing kafka producer"
        );
        let producer: FutureProducer = client_config(config)
            .create()
            .map_err(PublishError::Setup)?;

        let metadata = producer
            .client()
            .fetch_metadata(
                Some(config.topic.as_str()),
                Timeout::After(config.connect_timeout),
            )
            .map_err(|source| PublishError::Unreachable {
                topic: config.topic.clone(),
                source,
            })?;
        for topic in metadata.topics() {
            match topic.error() {
                // Brokers with auto-create enabled report the topic missing until first write.
                Some(code) => warn!(
                    topic = topic.name(),
                    error = ?code,
                    "topic metadata reported an error"
                ),
                None => info!(
                    topic = topic.name(),
                    partitions = topic.partitions().len(),
                    "kafka topic available"
                ),
            }
        }

        Ok(Self {
            producer,
            topic: config.topic.clone(),
            queue_timeout: config.message_timeout,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Wait for in-flight records to be acknowledged before shutdown.
    pub fn flush(&self, timeout: Duration) -> Result<(), PublishError> {
        info!(timeout_ms = timeout.as_millis(), "flushing kafka producer");
        self.producer
            .flush(Timeout::After(timeout))
            .map_err(PublishError::Delivery)
    }
}

#[async_trait]
impl Publisher for KafkaPublisher {
    async fn publish(&self, message: &OutboundMessage) -> Result<Delivery, PublishError> {
        let mut record = FutureRecord::<str, [u8]>::to(&message.topic).payload(&message.value);
        if let Some(key) = message.key.as_deref() {
            record = record.key(key);
        }
        if let Some(partition) = message.partition {
            record = record.partition(partition);
        }

        let start = Instant::now();
        match self.producer.send(record, self.queue_timeout).await {
            Ok((partition, offset)) => {
                info!(
                    partition,
                    offset,
                    bytes = message.value.len(),
                    key = message.key.as_deref(),
                    latency_ms = start.elapsed().as_millis(),
                    "segment persisted to kafka"
                );
                Ok(Delivery { partition, offset })
            }
            // Logged once by the request handler.
            Err((err, _)) => Err(PublishError::Delivery(err)),
        }
    }
}

/// Producer settings; delivery is only reported after the configured acks are in.
pub(crate) fn client_config(config: &KafkaConfig) -> ClientConfig {
    let mut client_config = ClientConfig::new();
    client_config
        .set("bootstrap.servers", &config.brokers)
        .set("acks", &config.acks)
        .set(
            "message.timeout.ms",
            config.message_timeout.as_millis().to_string(),
        )
        .set(
            "socket.connection.setup.timeout.ms",
            config.connect_timeout.as_millis().max(1000).to_string(),
        )
        // Single-record requests; no batching window.
        .set("linger.ms", "0");
    client_config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kafka_config() -> KafkaConfig {
        KafkaConfig {
            brokers: "kafka-1:9092,kafka-2:9092".to_string(),
            topic: "segments".to_string(),
            acks: "all".to_string(),
            message_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_millis(500),
        }
    }

    #[test]
    fn client_config_requires_acknowledgment() {
        let config = client_config(&kafka_config());
        assert_eq!(
            config.get("bootstrap.servers"),
            Some("kafka-1:9092,kafka-2:9092")
        );
        assert_eq!(config.get("acks"), Some("all"));
        assert_eq!(config.get("message.timeout.ms"), Some("10000"));
        assert_eq!(
            config.get("socket.connection.setup.timeout.ms"),
            Some("1000")
        );
        assert_eq!(config.get("linger.ms"), Some("0"));
    }

    #[test]
    fn leader_acks_pass_through() {
        let mut kafka = kafka_config();
        kafka.acks = "1".to_string();
        assert_eq!(client_config(&kafka).get("acks"), Some("1"));
    }
}
