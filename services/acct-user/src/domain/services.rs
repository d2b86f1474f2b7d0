//! 外部协作方接口：密码散列与令牌签发
//!
//! 凭证存储和令牌的具体实现不属于本服务

use chrono::{DateTime, Utc};
use mailflow_common::UserId;
use mailflow_errors::AppResult;

/// 密码散列器
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> AppResult<String>;

    fn verify(&self, password: &str, hash: &str) -> AppResult<bool>;
}

/// 已签发的令牌
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub token_id: String,
    pub expires_at: DateTime<Utc>,
}

/// 令牌声明
#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub token_id: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

/// 令牌签发与校验
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user_id: &UserId) -> AppResult<IssuedToken>;

    /// 校验签名和有效期，返回令牌声明；吊销检查由调用方完成
    fn validate(&self, token: &str) -> AppResult<TokenClaims>;
}
