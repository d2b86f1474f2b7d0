//! mailflow-errors - 统一错误处理
//!
//! 按关注点拆分的类型化错误：发布、存储、发送各自一个枚举，
//! 重试还是终止的决策基于结构化数据而不是字符串匹配

use thiserror::Error;

/// 事件发布错误
#[derive(Debug, Error)]
pub enum PublishError {
    /// Broker 不可达或发送超时
    #[error("Broker unavailable: {0}")]
    Unavailable(String),

    /// 事件序列化失败
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// 通知记录存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 存储不可达或写入超时
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// 违反唯一键等数据库约束
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

/// 邮件发送错误
///
/// 调用方依赖 transient/permanent 的区分来决定重投递还是终止，
/// 这个分类属于接口契约的一部分
#[derive(Debug, Error)]
pub enum SendError {
    /// 网络或传输层错误，重试可望成功
    #[error("Transient send failure: {0}")]
    Transient(String),

    /// 地址非法、模板渲染失败等，重试不会成功
    #[error("Permanent send failure: {0}")]
    Permanent(String),
}

impl SendError {
    pub fn is_transient(&self) -> bool {
        matches!(self, SendError::Transient(_))
    }
}

/// 应用层错误
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// 转换为 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Conflict(_) => 409,
            Self::Unauthorized(_) => 401,
            Self::Internal(_) => 500,
        }
    }
}

/// 注册路径的发布失败向调用方传播为注册失败
impl From<PublishError> for AppError {
    fn from(err: PublishError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_error_classification() {
        assert!(SendError::Transient("connection refused".into()).is_transient());
        assert!(!SendError::Permanent("invalid address".into()).is_transient());
    }

    #[test]
    fn test_publish_error_propagates_as_internal() {
        let err: AppError = PublishError::Unavailable("broker down".into()).into();
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::validation("bad code").status_code(), 400);
        assert_eq!(AppError::conflict("email exists").status_code(), 409);
        assert_eq!(AppError::not_found("user").status_code(), 404);
    }
}
