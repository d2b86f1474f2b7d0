//! 通知记录存储接口

use async_trait::async_trait;
use mailflow_errors::StoreError;

use super::notification::NotificationRecord;

/// 通知记录存储
///
/// 只追加。写入失败意味着这次尝试没有被持久记录，
/// 调用方按瞬时失败处理并等待重投递。
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn save(&self, record: &NotificationRecord) -> Result<(), StoreError>;
}
