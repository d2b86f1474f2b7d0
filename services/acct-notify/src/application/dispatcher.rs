//! 通知分发器
//!
//! 每条消息的处理序列：先写通知记录，再发邮件。
//! 先落记录保证邮件环节崩溃时尝试也有审计痕迹，代价是
//! 记录的是"尝试过投递"而不是"投递成功"；重投递时整个
//! 序列重跑，每次尝试各留一条记录。

use std::sync::Arc;

use chrono::Utc;
use mailflow_adapter_email::EmailSender;
use mailflow_adapter_kafka::ConsumedMessage;
use mailflow_ports::DispatchOutcome;
use tracing::{error, info};

use crate::domain::events::wire_datetime;
use crate::domain::{
    EmailTemplates, LoginEvent, NotificationRecord, NotificationStore, NotificationType,
    RegistrationEvent,
};

/// 通知分发器
pub struct NotificationDispatcher {
    store: Arc<dyn NotificationStore>,
    email: Arc<dyn EmailSender>,
}

impl NotificationDispatcher {
    pub fn new(store: Arc<dyn NotificationStore>, email: Arc<dyn EmailSender>) -> Self {
        Self { store, email }
    }

    /// 处理注册确认消息
    pub async fn handle_confirmation(&self, message: ConsumedMessage) -> DispatchOutcome {
        let event: RegistrationEvent = match message.parse_payload() {
            Ok(event) => event,
            Err(e) => {
                error!(topic = %message.topic, offset = message.offset, "Malformed confirmation payload: {}", e);
                return DispatchOutcome::PermanentFailure(format!("Malformed payload: {}", e));
            }
        };

        self.dispatch_registration(&event).await
    }

    /// 处理登录消息
    pub async fn handle_login(&self, message: ConsumedMessage) -> DispatchOutcome {
        let event: LoginEvent = match message.parse_payload() {
            Ok(event) => event,
            Err(e) => {
                error!(topic = %message.topic, offset = message.offset, "Malformed login payload: {}", e);
                return DispatchOutcome::PermanentFailure(format!("Malformed payload: {}", e));
            }
        };

        self.dispatch_login(&event).await
    }

    /// 投递验证码邮件
    pub async fn dispatch_registration(&self, event: &RegistrationEvent) -> DispatchOutcome {
        if let Err(e) = self.persist_attempt(NotificationType::UserVerification).await {
            return e;
        }

        let template = EmailTemplates::UserVerification;
        let context = serde_json::json!({
            "verificationCode": event.verification_code,
            "verificationCodeExpiration": event
                .verification_code_expiration
                .format(wire_datetime::FORMAT)
                .to_string(),
        });

        match self
            .email
            .send_template(&event.email, template.subject(), template.template(), &context)
            .await
        {
            Ok(()) => {
                info!(user_id = %event.user_id, "Verification email dispatched");
                DispatchOutcome::Sent
            }
            Err(e) => {
                error!(user_id = %event.user_id, error = %e, "Failed to send verification email");
                e.into()
            }
        }
    }

    /// 投递登录提醒邮件
    pub async fn dispatch_login(&self, event: &LoginEvent) -> DispatchOutcome {
        if let Err(e) = self.persist_attempt(NotificationType::UserLogin).await {
            return e;
        }

        let template = EmailTemplates::UserLogin;
        let context = serde_json::json!({
            "userLoginTime": event.user_login_time.format(wire_datetime::FORMAT).to_string(),
        });

        match self
            .email
            .send_template(&event.email, template.subject(), template.template(), &context)
            .await
        {
            Ok(()) => {
                info!(user_id = %event.user_id, "Login email dispatched");
                DispatchOutcome::Sent
            }
            Err(e) => {
                error!(user_id = %event.user_id, error = %e, "Failed to send login email");
                e.into()
            }
        }
    }

    /// 先落记录：存储失败按瞬时失败处理，等待重投递
    async fn persist_attempt(
        &self,
        notification_type: NotificationType,
    ) -> Result<(), DispatchOutcome> {
        let record = NotificationRecord::new(notification_type, Utc::now().naive_utc());
        self.store.save(&record).await.map_err(|e| {
            error!(
                notification_type = notification_type.as_str(),
                error = %e,
                "Failed to persist notification record"
            );
            DispatchOutcome::from(e)
        })
    }
}
