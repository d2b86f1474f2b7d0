//! 验证码生成与有效性判定

use chrono::{DateTime, Duration, Utc};
use mailflow_config::VerificationConfig;
use mailflow_errors::{AppError, AppResult};
use rand::Rng;
use rand::distributions::Alphanumeric;

/// 验证码长度下限
///
/// 62 个字符的字母表下 10 位约 59.5 bit 熵，配置不允许低于此值
pub const MIN_CODE_LENGTH: usize = 10;

/// 验证码
///
/// 不变量：expires_at > issued_at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCode {
    pub value: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl VerificationCode {
    /// 验证码是否仍在有效期内
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// 候选值是否与当前验证码一致
    pub fn matches(&self, candidate: &str) -> bool {
        self.value == candidate
    }
}

/// 验证码生成器
///
/// 纯函数式：无 I/O、无共享状态，可被多个请求线程并发调用
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    length: usize,
    ttl: Duration,
}

impl CodeGenerator {
    pub fn new(config: &VerificationConfig) -> AppResult<Self> {
        if config.code_length < MIN_CODE_LENGTH {
            return Err(AppError::validation(format!(
                "Verification code length {} is below the minimum of {}",
                config.code_length, MIN_CODE_LENGTH
            )));
        }

        Ok(Self {
            length: config.code_length,
            ttl: Duration::minutes(config.code_ttl_minutes),
        })
    }

    /// 生成一个新的验证码，过期时刻固定为 now + ttl
    pub fn generate(&self, now: DateTime<Utc>) -> VerificationCode {
        let value: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect();

        VerificationCode {
            value,
            issued_at: now,
            expires_at: now + self.ttl,
        }
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(&VerificationConfig::default()).unwrap()
    }
}
