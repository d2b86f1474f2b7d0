//! Kafka 适配器
//!
//! 提供事件发布和消费功能：
//! - 按 key 分区的消息发布
//! - 手动提交 + seek 重投递的消费循环
//! - 永久失败和超限消息进入 DLQ

mod config;
mod consumer;
mod producer;

pub use config::{ConsumerConfig, ProducerConfig};
pub use consumer::{
    ConsumedMessage, DlqMessage, DlqMetadata, KafkaEventConsumer, MessageAction, action_for,
};
pub use producer::KafkaEventPublisher;
