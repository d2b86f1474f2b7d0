//! PostgreSQL 通知记录存储

use async_trait::async_trait;
use mailflow_errors::StoreError;
use sqlx::PgPool;
use tracing::debug;

use crate::domain::{NotificationRecord, NotificationStore};

/// PostgreSQL 存储实现
pub struct PostgresNotificationStore {
    pool: PgPool,
}

impl PostgresNotificationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// SQLx 错误到 StoreError 的映射
///
/// 23 开头的 PostgreSQL 错误码是约束违规，其余按不可用处理
fn map_store_error(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::Database(db_err) => {
            if db_err.code().is_some_and(|code| code.starts_with("23")) {
                StoreError::ConstraintViolation(db_err.to_string())
            } else {
                StoreError::Unavailable(db_err.to_string())
            }
        }
        other => StoreError::Unavailable(other.to_string()),
    }
}

#[async_trait]
impl NotificationStore for PostgresNotificationStore {
    async fn save(&self, record: &NotificationRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO notification (notification_id, notification_type, send_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(record.id)
        .bind(record.notification_type.as_str())
        .bind(record.sent_at)
        .execute(&self.pool)
        .await
        .map_err(map_store_error)?;

        debug!(
            notification_id = %record.id,
            notification_type = record.notification_type.as_str(),
            "Notification record saved"
        );

        Ok(())
    }
}
