//! 消费侧的账号事件定义
//!
//! 与 acct-user 的发布格式逐字段对齐；本服务只反序列化，不回写

use chrono::NaiveDateTime;
use serde::Deserialize;
use uuid::Uuid;

/// 注册事件 topic
pub const USER_CONFIRMATION_TOPIC: &str = "user-confirmation-topic";
/// 登录事件 topic
pub const USER_LOGIN_TOPIC: &str = "user-login-topic";

/// 线上时间格式：yyyy-MM-ddTHH:mm:ss，不带时区偏移
pub(crate) mod wire_datetime {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// 用户已注册，携带待投递的验证码
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationEvent {
    pub user_id: Uuid,
    pub email: String,
    pub verification_code: String,
    #[serde(deserialize_with = "wire_datetime::deserialize")]
    pub verification_code_expiration: NaiveDateTime,
}

/// 用户已登录
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginEvent {
    pub user_id: Uuid,
    pub email: String,
    #[serde(deserialize_with = "wire_datetime::deserialize")]
    pub user_login_time: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_registration_event() {
        let json = r#"{"userId":"0190e1a0-0000-7000-8000-000000000001","email":"a@x.com","verificationCode":"A1b2C3d4E5","verificationCodeExpiration":"2024-06-01T12:05:00"}"#;

        let event: RegistrationEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.email, "a@x.com");
        assert_eq!(event.verification_code, "A1b2C3d4E5");
        assert_eq!(
            event.verification_code_expiration.format("%H:%M:%S").to_string(),
            "12:05:00"
        );
    }

    #[test]
    fn test_parse_login_event() {
        let json = r#"{"userId":"0190e1a0-0000-7000-8000-000000000002","email":"b@x.com","userLoginTime":"2024-06-01T09:30:15"}"#;

        let event: LoginEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.email, "b@x.com");
    }

    #[test]
    fn test_offset_suffixed_timestamp_is_rejected() {
        let json = r#"{"userId":"0190e1a0-0000-7000-8000-000000000002","email":"b@x.com","userLoginTime":"2024-06-01T09:30:15Z"}"#;

        assert!(serde_json::from_str::<LoginEvent>(json).is_err());
    }
}
