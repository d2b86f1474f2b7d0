//! 内存版令牌吊销集合
//!
//! 条目 TTL 即令牌剩余有效期：令牌自身过期后无需继续记录。
//! 读多写少，用 RwLock；过期条目在写入时顺带清理。

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use mailflow_ports::TokenRevocationSet;
use tokio::sync::RwLock;

/// 内存吊销集合
#[derive(Default)]
pub struct InMemoryTokenRevocationSet {
    entries: RwLock<HashMap<String, Instant>>,
}

impl InMemoryTokenRevocationSet {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenRevocationSet for InMemoryTokenRevocationSet {
    async fn revoke(&self, token_id: &str, ttl: Duration) {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        entries.retain(|_, expires_at| *expires_at > now);
        entries.insert(token_id.to_string(), now + ttl);
    }

    async fn is_revoked(&self, token_id: &str) -> bool {
        let entries = self.entries.read().await;
        match entries.get(token_id) {
            Some(expires_at) => *expires_at > Instant::now(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_revoked_token_is_reported() {
        let set = InMemoryTokenRevocationSet::new();
        set.revoke("token-1", Duration::from_secs(60)).await;

        assert!(set.is_revoked("token-1").await);
        assert!(!set.is_revoked("token-2").await);
    }

    #[tokio::test]
    async fn test_entry_expires_with_ttl() {
        let set = InMemoryTokenRevocationSet::new();
        set.revoke("token-1", Duration::from_millis(10)).await;

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!set.is_revoked("token-1").await);
    }

    #[tokio::test]
    async fn test_expired_entries_are_swept_on_write() {
        let set = InMemoryTokenRevocationSet::new();
        set.revoke("stale", Duration::from_millis(10)).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        set.revoke("fresh", Duration::from_secs(60)).await;
        let entries = set.entries.read().await;
        assert!(!entries.contains_key("stale"));
        assert!(entries.contains_key("fresh"));
    }
}
