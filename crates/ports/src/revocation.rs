//! 令牌吊销集合接口
//!
//! 以令牌标识为键、TTL 为令牌剩余有效期的过期集合，
//! 实现必须可被多个工作线程并发使用

use std::time::Duration;

use async_trait::async_trait;

/// 令牌吊销集合
#[async_trait]
pub trait TokenRevocationSet: Send + Sync {
    /// 吊销令牌，条目在 ttl 过后失效
    async fn revoke(&self, token_id: &str, ttl: Duration);

    /// 查询令牌是否已被吊销
    async fn is_revoked(&self, token_id: &str) -> bool;
}
