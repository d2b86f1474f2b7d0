//! 用户仓储接口
//!
//! 存储与 ORM 映射由外部协作方提供，这里只定义契约

use async_trait::async_trait;
use mailflow_errors::AppResult;

use super::user::User;

/// 用户仓储
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn exists_by_username(&self, username: &str) -> AppResult<bool>;

    async fn exists_by_email(&self, email: &str) -> AppResult<bool>;

    /// 插入或整体更新
    async fn save(&self, user: &User) -> AppResult<()>;
}
