//! 用户实体

use chrono::{DateTime, Utc};
use mailflow_common::UserId;

use super::value_objects::Email;
use super::verification::VerificationCode;

/// 用户
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub username: String,
    pub email: Email,
    pub password_hash: String,
    /// 验证通过后置为 true
    pub enabled: bool,
    /// 当前在档的验证码；消费后清空，补发时整体覆盖
    pub verification_code: Option<VerificationCode>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        email: Email,
        password_hash: impl Into<String>,
        verification_code: VerificationCode,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: UserId::new(),
            username: username.into(),
            email,
            password_hash: password_hash.into(),
            enabled: false,
            verification_code: Some(verification_code),
            created_at: now,
        }
    }

    /// 补发验证码：旧码直接被新码取代
    pub fn set_verification_code(&mut self, code: VerificationCode) {
        self.verification_code = Some(code);
    }

    /// 尝试用候选码完成验证
    ///
    /// 仅当候选码与在档验证码一致且未过期时通过；
    /// 通过后清除验证码（一次性）并启用账号。
    /// 失败不清除在档验证码。
    pub fn apply_verification(&mut self, candidate: &str, now: DateTime<Utc>) -> bool {
        match &self.verification_code {
            Some(code) if !code.is_expired(now) && code.matches(candidate) => {
                self.verification_code = None;
                self.enabled = true;
                true
            }
            _ => false,
        }
    }
}
