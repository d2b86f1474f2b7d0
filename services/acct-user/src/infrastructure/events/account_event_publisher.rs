//! 账号事件发布
//!
//! 注册事件同步发布：调用方需要确认发布成功才能返回成功响应。
//! 登录事件尽力而为：发布失败记日志吞掉，登录不因通知失败而失败。

use std::sync::Arc;

use mailflow_adapter_kafka::{KafkaEventPublisher, ProducerConfig};
use mailflow_config::KafkaConfig;
use mailflow_errors::PublishError;
use mailflow_ports::{EventPublisher, publish_event};
use tracing::{debug, warn};

use crate::domain::events::{AccountEvent, LoginEvent, RegistrationEvent};

/// 账号事件发布器
pub struct AccountEventPublisher {
    publisher: Arc<dyn EventPublisher>,
}

impl AccountEventPublisher {
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self { publisher }
    }

    /// 从 Kafka 配置组装
    pub fn from_kafka_config(config: &KafkaConfig) -> Result<Self, PublishError> {
        let producer_config = ProducerConfig::new(&config.brokers)
            .with_client_id("acct-user")
            .with_request_timeout(std::time::Duration::from_secs(config.request_timeout_secs));

        let publisher = KafkaEventPublisher::new(&producer_config)?;
        Ok(Self::new(Arc::new(publisher)))
    }

    /// 同步发布注册事件，失败向调用方传播
    pub async fn publish_registration(
        &self,
        event: &RegistrationEvent,
    ) -> Result<(), PublishError> {
        let (partition, offset) = publish(
            self.publisher.as_ref(),
            &AccountEvent::Registration(event.clone()),
        )
        .await?;

        debug!(
            user_id = %event.user_id,
            partition,
            offset,
            "Registration event published"
        );
        Ok(())
    }

    /// 发布登录事件，不等待结果
    pub fn publish_login_detached(&self, event: LoginEvent) {
        let publisher = Arc::clone(&self.publisher);
        tokio::spawn(async move {
            let user_id = event.user_id;
            if let Err(e) = publish(publisher.as_ref(), &AccountEvent::Login(event)).await {
                warn!(user_id = %user_id, error = %e, "Failed to publish login event");
            }
        });
    }
}

/// 按事件类型路由 topic，按账号 ID 设置分区键
async fn publish(
    publisher: &dyn EventPublisher,
    event: &AccountEvent,
) -> Result<(i32, i64), PublishError> {
    let topic = event.topic();
    let key = event.partition_key();

    match event {
        AccountEvent::Registration(e) => publish_event(publisher, topic, &key, e).await,
        AccountEvent::Login(e) => publish_event(publisher, topic, &key, e).await,
    }
}
