//! 单次投递尝试的结果
//!
//! 消费端的 ack/重投递决策建立在这个枚举上，不做字符串匹配

use mailflow_errors::{SendError, StoreError};

/// 一次投递尝试的结果，不持久化
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// 投递成功，消息可以确认
    Sent,
    /// 瞬时失败，不确认，等待 broker 重投递
    TransientFailure(String),
    /// 永久失败，确认消息并上报运维通道
    PermanentFailure(String),
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DispatchOutcome::Sent)
    }
}

/// 存储失败意味着这次尝试没有被持久记录，按瞬时失败处理
impl From<StoreError> for DispatchOutcome {
    fn from(err: StoreError) -> Self {
        DispatchOutcome::TransientFailure(err.to_string())
    }
}

impl From<SendError> for DispatchOutcome {
    fn from(err: SendError) -> Self {
        match err {
            SendError::Transient(reason) => DispatchOutcome::TransientFailure(reason),
            SendError::Permanent(reason) => DispatchOutcome::PermanentFailure(reason),
        }
    }
}
