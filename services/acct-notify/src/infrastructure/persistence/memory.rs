//! 内存版通知记录存储（测试用）

use std::sync::Mutex;

use async_trait::async_trait;
use mailflow_errors::StoreError;

use crate::domain::{NotificationRecord, NotificationStore};

/// 内存存储实现
#[derive(Default)]
pub struct InMemoryNotificationStore {
    records: Mutex<Vec<NotificationRecord>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<NotificationRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn save(&self, record: &NotificationRecord) -> Result<(), StoreError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}
