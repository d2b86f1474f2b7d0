//! Kafka Consumer
//!
//! 手动提交的消费循环。处理结果决定消息去向：
//! - Sent: 提交偏移
//! - TransientFailure: 不提交，seek 回原偏移等待重投递，超过上限进 DLQ
//! - PermanentFailure: 进 DLQ 并提交，避免无法投递的消息被无限重投

use std::collections::HashMap;
use std::time::Duration;

use futures_util::StreamExt;
use mailflow_errors::{AppError, AppResult};
use mailflow_ports::DispatchOutcome;
use rdkafka::Offset;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::ConsumerConfig;

/// 消费的消息
#[derive(Debug, Clone)]
pub struct ConsumedMessage {
    /// Topic
    pub topic: String,
    /// 分区
    pub partition: i32,
    /// 偏移量
    pub offset: i64,
    /// 消息键
    pub key: Option<String>,
    /// 消息内容
    pub payload: String,
    /// 时间戳
    pub timestamp: Option<i64>,
}

impl ConsumedMessage {
    /// 解析 JSON 负载
    pub fn parse_payload<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.payload)
    }
}

/// DLQ 消息元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DlqMetadata {
    /// 原始 topic
    pub original_topic: String,
    /// 原始 partition
    pub original_partition: i32,
    /// 原始 offset
    pub original_offset: i64,
    /// 失败原因
    pub reason: String,
    /// 已经历的重投递次数
    pub redeliveries: u32,
    /// 失败时间戳
    pub failed_at: i64,
}

/// DLQ 消息包装
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DlqMessage {
    /// 元数据
    pub metadata: DlqMetadata,
    /// 原始消息内容
    pub payload: String,
}

/// 处理结果对应的消息去向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageAction {
    /// 提交偏移，消息完成
    Commit,
    /// 不提交，seek 回原偏移触发重投递
    SeekRetry,
    /// 写入 DLQ 后提交
    DlqCommit,
}

/// 根据处理结果和已重投递次数决定消息去向
pub fn action_for(
    outcome: &DispatchOutcome,
    redeliveries: u32,
    max_redeliveries: u32,
) -> MessageAction {
    match outcome {
        DispatchOutcome::Sent => MessageAction::Commit,
        DispatchOutcome::PermanentFailure(_) => MessageAction::DlqCommit,
        DispatchOutcome::TransientFailure(_) if redeliveries >= max_redeliveries => {
            MessageAction::DlqCommit
        }
        DispatchOutcome::TransientFailure(_) => MessageAction::SeekRetry,
    }
}

/// Kafka Event Consumer
pub struct KafkaEventConsumer {
    consumer: StreamConsumer,
    dlq_producer: Option<FutureProducer>,
    config: ConsumerConfig,
}

impl KafkaEventConsumer {
    pub fn new(config: ConsumerConfig) -> AppResult<Self> {
        let mut client_config = ClientConfig::new();

        for (key, value) in config.to_client_config_entries() {
            client_config.set(&key, &value);
        }

        let consumer: StreamConsumer = client_config
            .create()
            .map_err(|e| AppError::internal(format!("Failed to create Kafka consumer: {}", e)))?;

        let topics: Vec<&str> = config.topics.iter().map(|s| s.as_str()).collect();
        consumer
            .subscribe(&topics)
            .map_err(|e| AppError::internal(format!("Failed to subscribe to topics: {}", e)))?;

        let dlq_producer = if config.enable_dlq {
            let producer: FutureProducer = ClientConfig::new()
                .set("bootstrap.servers", &config.brokers)
                .set("client.id", format!("{}-dlq-producer", config.group_id))
                .create()
                .map_err(|e| {
                    AppError::internal(format!("Failed to create DLQ producer: {}", e))
                })?;
            Some(producer)
        } else {
            None
        };

        info!(
            group_id = %config.group_id,
            topics = ?config.topics,
            "Kafka consumer created"
        );

        Ok(Self {
            consumer,
            dlq_producer,
            config,
        })
    }

    /// 开始消费消息
    ///
    /// handler 对每条消息执行完整的处理序列并返回结果；
    /// 瞬时失败时同一条消息会被完整地重新投递，handler 必须可安全重跑。
    /// 循环被取消时未提交的消息保持未确认，重启后由 broker 重投递。
    pub async fn run<F, Fut>(&self, handler: F) -> AppResult<()>
    where
        F: Fn(ConsumedMessage) -> Fut + Send + Sync,
        Fut: Future<Output = DispatchOutcome> + Send,
    {
        let mut stream = self.consumer.stream();
        // 每个分区当前卡在队头的消息的 (offset, 重投递次数)
        let mut redeliveries: HashMap<(String, i32), (i64, u32)> = HashMap::new();

        while let Some(result) = stream.next().await {
            let message = match result {
                Ok(message) => message,
                Err(e) => {
                    error!("Kafka error: {}", e);
                    continue;
                }
            };

            let topic = message.topic().to_string();
            let partition = message.partition();
            let offset = message.offset();

            let payload = match message.payload_view::<str>() {
                Some(Ok(s)) => s.to_string(),
                Some(Err(e)) => {
                    error!(topic = %topic, partition, offset, "Non-UTF8 message payload: {}", e);
                    self.finish_dlq(&topic, partition, offset, "", &format!("Non-UTF8 payload: {}", e), 0)
                        .await;
                    self.commit(&message);
                    continue;
                }
                None => {
                    debug!(topic = %topic, partition, offset, "Empty message, skipping");
                    continue;
                }
            };

            let key = message
                .key_view::<str>()
                .and_then(|r| r.ok())
                .map(|s| s.to_string());

            let timestamp = message.timestamp().to_millis();

            let consumed = ConsumedMessage {
                topic: topic.clone(),
                partition,
                offset,
                key,
                payload: payload.clone(),
                timestamp,
            };

            let outcome = handler(consumed).await;

            let partition_key = (topic.clone(), partition);
            let attempts = match redeliveries.get(&partition_key) {
                Some((blocked_offset, n)) if *blocked_offset == offset => *n,
                _ => 0,
            };

            match action_for(&outcome, attempts, self.config.max_redeliveries) {
                MessageAction::Commit => {
                    redeliveries.remove(&partition_key);
                    self.commit(&message);
                }
                MessageAction::SeekRetry => {
                    let reason = match &outcome {
                        DispatchOutcome::TransientFailure(reason) => reason.clone(),
                        _ => String::new(),
                    };
                    let next_attempt = attempts + 1;
                    redeliveries.insert(partition_key, (offset, next_attempt));

                    let backoff = self.config.redelivery_backoff.delay_for_attempt(attempts);
                    warn!(
                        topic = %topic,
                        partition,
                        offset,
                        redelivery = next_attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        reason = %reason,
                        "Transient failure, message will be redelivered"
                    );
                    tokio::time::sleep(backoff).await;

                    if let Err(e) =
                        self.consumer
                            .seek(&topic, partition, Offset::Offset(offset), Timeout::After(Duration::from_secs(5)))
                    {
                        error!(topic = %topic, partition, offset, "Failed to seek for redelivery: {}", e);
                    }
                }
                MessageAction::DlqCommit => {
                    let reason = match &outcome {
                        DispatchOutcome::PermanentFailure(reason) => reason.clone(),
                        DispatchOutcome::TransientFailure(reason) => {
                            format!("Redelivery limit exceeded: {}", reason)
                        }
                        DispatchOutcome::Sent => String::new(),
                    };
                    error!(
                        topic = %topic,
                        partition,
                        offset,
                        redeliveries = attempts,
                        reason = %reason,
                        "Message failed terminally"
                    );
                    redeliveries.remove(&partition_key);
                    self.finish_dlq(&topic, partition, offset, &payload, &reason, attempts)
                        .await;
                    self.commit(&message);
                }
            }
        }

        info!("Kafka consumer stopped");
        Ok(())
    }

    fn commit(&self, message: &rdkafka::message::BorrowedMessage<'_>) {
        if let Err(e) = self.consumer.commit_message(message, CommitMode::Async) {
            error!("Failed to commit offset: {}", e);
        }
    }

    async fn finish_dlq(
        &self,
        original_topic: &str,
        partition: i32,
        offset: i64,
        payload: &str,
        reason: &str,
        redeliveries: u32,
    ) {
        if let Err(e) = self
            .send_to_dlq(original_topic, partition, offset, payload, reason, redeliveries)
            .await
        {
            error!("Failed to send to DLQ: {}", e);
        }
    }

    /// 发送消息到 DLQ
    async fn send_to_dlq(
        &self,
        original_topic: &str,
        partition: i32,
        offset: i64,
        payload: &str,
        reason: &str,
        redeliveries: u32,
    ) -> AppResult<()> {
        if !self.config.enable_dlq {
            warn!("DLQ is disabled, message will be lost");
            return Ok(());
        }

        let dlq_producer = self
            .dlq_producer
            .as_ref()
            .ok_or_else(|| AppError::internal("DLQ producer not initialized"))?;

        let dlq_topic = format!("{}{}", original_topic, self.config.dlq_suffix);

        let dlq_message = DlqMessage {
            metadata: DlqMetadata {
                original_topic: original_topic.to_string(),
                original_partition: partition,
                original_offset: offset,
                reason: reason.to_string(),
                redeliveries,
                failed_at: chrono::Utc::now().timestamp(),
            },
            payload: payload.to_string(),
        };

        let dlq_payload = serde_json::to_string(&dlq_message)
            .map_err(|e| AppError::internal(format!("Failed to serialize DLQ message: {}", e)))?;

        let record: FutureRecord<'_, str, String> = FutureRecord::to(&dlq_topic)
            .payload(&dlq_payload)
            .key(original_topic);

        dlq_producer
            .send(record, Timeout::After(Duration::from_secs(5)))
            .await
            .map_err(|(e, _)| AppError::internal(format!("Failed to send to DLQ: {}", e)))?;

        warn!(
            dlq_topic = %dlq_topic,
            original_topic = %original_topic,
            partition,
            offset,
            reason = %reason,
            "Message sent to DLQ"
        );

        Ok(())
    }

    /// 获取消费者组 ID
    pub fn group_id(&self) -> &str {
        &self.config.group_id
    }

    /// 获取订阅的 topics
    pub fn topics(&self) -> &[String] {
        &self.config.topics
    }
}
