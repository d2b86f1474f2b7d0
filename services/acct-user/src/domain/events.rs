//! 账号领域事件与线上格式
//!
//! 字段名和时间格式是跨服务契约，保持稳定。
//! 时间一律按 UTC 渲染，不带时区偏移，双方约定在配置层面对齐。

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 注册事件 topic
pub const USER_CONFIRMATION_TOPIC: &str = "user-confirmation-topic";
/// 登录事件 topic
pub const USER_LOGIN_TOPIC: &str = "user-login-topic";

/// 线上时间格式：yyyy-MM-ddTHH:mm:ss
pub(crate) mod wire_datetime {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// 用户已注册，携带待投递的验证码
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationEvent {
    pub user_id: Uuid,
    /// 事件发生时刻的投递地址，之后不再回读账号
    pub email: String,
    pub verification_code: String,
    #[serde(with = "wire_datetime")]
    pub verification_code_expiration: NaiveDateTime,
}

/// 用户已登录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginEvent {
    pub user_id: Uuid,
    pub email: String,
    #[serde(with = "wire_datetime")]
    pub user_login_time: NaiveDateTime,
}

/// 账号事件
///
/// 发布前由 Publisher 独占持有，交给 broker 后成为不可变的线上记录
#[derive(Debug, Clone, PartialEq)]
pub enum AccountEvent {
    Registration(RegistrationEvent),
    Login(LoginEvent),
}

impl AccountEvent {
    /// 事件类型对应的 topic
    pub fn topic(&self) -> &'static str {
        match self {
            AccountEvent::Registration(_) => USER_CONFIRMATION_TOPIC,
            AccountEvent::Login(_) => USER_LOGIN_TOPIC,
        }
    }

    /// 分区键：同一账号的事件全部落在同一分区
    pub fn partition_key(&self) -> String {
        match self {
            AccountEvent::Registration(e) => e.user_id.to_string(),
            AccountEvent::Login(e) => e.user_id.to_string(),
        }
    }
}
