//! Email 适配器
//!
//! 提供模板邮件发送，发送失败区分 transient/permanent，
//! 这个分类是调用方重投递决策的依据

mod client;
mod template;

pub use client::EmailClient;
pub use template::EmailTemplate;

use async_trait::async_trait;
use mailflow_errors::SendError;

/// 邮件发送接口
///
/// 实现必须将失败分类：网络/传输层问题返回 Transient，
/// 地址非法、模板渲染失败等返回 Permanent
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// 渲染模板并发送邮件
    async fn send_template(
        &self,
        to: &str,
        subject: &str,
        template_name: &str,
        context: &serde_json::Value,
    ) -> Result<(), SendError>;
}
