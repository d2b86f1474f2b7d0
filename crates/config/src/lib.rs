//! mailflow-config - 配置加载库

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use secrecy::Secret;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),
}

/// Kafka 配置
#[derive(Debug, Clone, Deserialize)]
pub struct KafkaConfig {
    pub brokers: String,
    #[serde(default = "default_group_id")]
    pub group_id: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_group_id() -> String {
    "user-group".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// 消费端重投递配置
#[derive(Debug, Clone, Deserialize)]
pub struct ConsumerConfig {
    /// 瞬时失败触发重投递的次数上限，超过后消息进入 DLQ
    #[serde(default = "default_max_redeliveries")]
    pub max_redeliveries: u32,
    /// 重投递之间的初始退避（毫秒）
    #[serde(default = "default_redelivery_delay_ms")]
    pub redelivery_delay_ms: u64,
}

fn default_max_redeliveries() -> u32 {
    5
}

fn default_redelivery_delay_ms() -> u64 {
    500
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            max_redeliveries: default_max_redeliveries(),
            redelivery_delay_ms: default_redelivery_delay_ms(),
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    // 根据环境自动调整连接池大小
    match std::env::var("APP_ENV").as_deref() {
        Ok("production") => 50,
        _ => 10,
    }
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// 邮件配置
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: Secret<String>,
    pub from_email: String,
    pub from_name: String,
    #[serde(default)]
    pub use_tls: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_template_dir")]
    pub template_dir: String,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_template_dir() -> String {
    "templates".to_string()
}

/// 验证码配置
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationConfig {
    #[serde(default = "default_code_length")]
    pub code_length: usize,
    #[serde(default = "default_code_ttl_minutes")]
    pub code_ttl_minutes: i64,
}

fn default_code_length() -> usize {
    16
}

fn default_code_ttl_minutes() -> i64 {
    5
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            code_ttl_minutes: default_code_ttl_minutes(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    pub app_env: String,
    pub kafka: KafkaConfig,
    #[serde(default)]
    pub consumer: ConsumerConfig,
    pub database: Option<DatabaseConfig>,
    pub telemetry: TelemetryConfig,
    pub email: Option<EmailConfig>,
    #[serde(default)]
    pub verification: VerificationConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config: Self = Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("").split("_"))
            .extract()?;

        Ok(config)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}

#[cfg(test)]
mod tests;
