//! Kafka 配置模块
//!
//! 提供 producer/consumer 配置到 rdkafka ClientConfig 的映射

use std::time::Duration;

use mailflow_common::RetryConfig;

/// 自动偏移重置策略
#[derive(Debug, Clone, Default)]
pub enum AutoOffsetReset {
    #[default]
    Earliest,
    Latest,
}

impl AutoOffsetReset {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutoOffsetReset::Earliest => "earliest",
            AutoOffsetReset::Latest => "latest",
        }
    }
}

/// Producer 配置
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    /// Broker 地址列表
    pub brokers: String,
    /// 客户端 ID
    pub client_id: Option<String>,
    /// 确认模式：0=不等待，1=leader确认，-1=所有副本确认
    pub acks: i32,
    /// broker 侧重试次数
    pub retries: u32,
    /// 请求超时，所有发送调用都受它约束
    pub request_timeout: Duration,
}

impl ProducerConfig {
    pub fn new(brokers: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            client_id: None,
            acks: -1,
            retries: 3,
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_acks(mut self, acks: i32) -> Self {
        self.acks = acks;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// 转换为 rdkafka ClientConfig 的配置项
    pub fn to_client_config_entries(&self) -> Vec<(String, String)> {
        let mut entries = vec![
            ("bootstrap.servers".to_string(), self.brokers.clone()),
            ("acks".to_string(), self.acks.to_string()),
            ("retries".to_string(), self.retries.to_string()),
            (
                "request.timeout.ms".to_string(),
                self.request_timeout.as_millis().to_string(),
            ),
        ];

        if let Some(client_id) = &self.client_id {
            entries.push(("client.id".to_string(), client_id.clone()));
        }

        entries
    }
}

/// Consumer 配置
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Broker 地址列表
    pub brokers: String,
    /// 消费者组 ID
    pub group_id: String,
    /// 订阅的 topics
    pub topics: Vec<String>,
    /// 自动偏移重置策略
    pub auto_offset_reset: AutoOffsetReset,
    /// 会话超时
    pub session_timeout: Duration,
    /// 同一条消息因瞬时失败重投递的次数上限，超过后进入 DLQ
    pub max_redeliveries: u32,
    /// 重投递之间的退避曲线
    pub redelivery_backoff: RetryConfig,
    /// 是否启用 DLQ
    pub enable_dlq: bool,
    /// DLQ topic 后缀
    pub dlq_suffix: String,
}

impl ConsumerConfig {
    pub fn new(brokers: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            group_id: group_id.into(),
            topics: Vec::new(),
            auto_offset_reset: AutoOffsetReset::default(),
            session_timeout: Duration::from_secs(45),
            max_redeliveries: 5,
            redelivery_backoff: RetryConfig::default(),
            enable_dlq: true,
            dlq_suffix: ".dlq".to_string(),
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topics.push(topic.into());
        self
    }

    pub fn with_topics(mut self, topics: Vec<String>) -> Self {
        self.topics = topics;
        self
    }

    pub fn with_auto_offset_reset(mut self, reset: AutoOffsetReset) -> Self {
        self.auto_offset_reset = reset;
        self
    }

    pub fn with_max_redeliveries(mut self, max: u32) -> Self {
        self.max_redeliveries = max;
        self
    }

    pub fn with_redelivery_backoff(mut self, backoff: RetryConfig) -> Self {
        self.redelivery_backoff = backoff;
        self
    }

    pub fn with_dlq(mut self, enable: bool) -> Self {
        self.enable_dlq = enable;
        self
    }

    pub fn with_dlq_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.dlq_suffix = suffix.into();
        self
    }

    /// 转换为 rdkafka ClientConfig 的配置项
    ///
    /// 偏移提交始终是手动的，确认语义由消费循环控制
    pub fn to_client_config_entries(&self) -> Vec<(String, String)> {
        vec![
            ("bootstrap.servers".to_string(), self.brokers.clone()),
            ("group.id".to_string(), self.group_id.clone()),
            ("enable.auto.commit".to_string(), "false".to_string()),
            (
                "auto.offset.reset".to_string(),
                self.auto_offset_reset.as_str().to_string(),
            ),
            (
                "session.timeout.ms".to_string(),
                self.session_timeout.as_millis().to_string(),
            ),
        ]
    }
}
