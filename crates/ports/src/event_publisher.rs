//! Event Publisher trait 定义

use async_trait::async_trait;
use mailflow_errors::PublishError;
use serde::Serialize;

/// 事件发布者 trait
///
/// 消息按 key 路由到分区，同一账号的事件落在同一分区内有序
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// 发布带 key 的原始 JSON 负载，返回 (partition, offset)
    async fn publish_raw(
        &self,
        topic: &str,
        key: &str,
        payload: &str,
    ) -> Result<(i32, i64), PublishError>;
}

/// 序列化事件并发布
pub async fn publish_event<E: Serialize + Sync>(
    publisher: &dyn EventPublisher,
    topic: &str,
    key: &str,
    event: &E,
) -> Result<(i32, i64), PublishError> {
    let payload = serde_json::to_string(event)
        .map_err(|e| PublishError::Serialization(e.to_string()))?;

    publisher.publish_raw(topic, key, &payload).await
}
