//! Kafka Producer
//!
//! 按 key 分区的消息发布

use async_trait::async_trait;
use mailflow_errors::PublishError;
use mailflow_ports::EventPublisher;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::config::ProducerConfig;

/// Kafka Event Publisher
pub struct KafkaEventPublisher {
    producer: FutureProducer,
    timeout: Duration,
}

impl KafkaEventPublisher {
    pub fn new(config: &ProducerConfig) -> Result<Self, PublishError> {
        let mut client_config = ClientConfig::new();

        for (key, value) in config.to_client_config_entries() {
            client_config.set(&key, &value);
        }

        let producer: FutureProducer = client_config
            .create()
            .map_err(|e| PublishError::Unavailable(format!("Failed to create producer: {}", e)))?;

        Ok(Self {
            producer,
            timeout: config.request_timeout,
        })
    }

    /// 从 broker 地址创建
    pub fn from_brokers(brokers: &str) -> Result<Self, PublishError> {
        Self::new(&ProducerConfig::new(brokers))
    }

    /// 序列化并发布带 key 的事件
    pub async fn publish<E: Serialize + Send + Sync>(
        &self,
        topic: &str,
        key: &str,
        event: &E,
    ) -> Result<(i32, i64), PublishError> {
        let payload = serde_json::to_string(event)
            .map_err(|e| PublishError::Serialization(e.to_string()))?;

        self.publish_raw(topic, key, &payload).await
    }

    /// 刷新所有待发送的消息
    pub fn flush(&self, timeout: Duration) {
        let _ = self.producer.flush(Timeout::After(timeout));
    }
}

#[async_trait]
impl EventPublisher for KafkaEventPublisher {
    async fn publish_raw(
        &self,
        topic: &str,
        key: &str,
        payload: &str,
    ) -> Result<(i32, i64), PublishError> {
        let record = FutureRecord::to(topic).payload(payload).key(key);

        let (partition, offset) = self
            .producer
            .send(record, Timeout::After(self.timeout))
            .await
            .map_err(|(e, _)| PublishError::Unavailable(e.to_string()))?;

        debug!(
            topic = topic,
            key = key,
            partition = partition,
            offset = offset,
            "Message published"
        );

        Ok((partition, offset))
    }
}
