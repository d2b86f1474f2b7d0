//! 邮件客户端实现

use std::sync::Arc;
use std::time::Duration;

use email_address::EmailAddress;
use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use mailflow_config::EmailConfig;
use mailflow_errors::SendError;
use secrecy::ExposeSecret;
use tracing::{debug, info};

use crate::{EmailSender, EmailTemplate};

/// 邮件客户端
pub struct EmailClient {
    config: EmailConfig,
    template: Arc<EmailTemplate>,
}

impl EmailClient {
    pub fn new(config: EmailConfig, template: EmailTemplate) -> Self {
        Self {
            config,
            template: Arc::new(template),
        }
    }

    /// 构建 SMTP 传输
    ///
    /// 连接和握手问题在发送时才暴露，这里的失败按瞬时处理
    fn build_transport(&self) -> Result<SmtpTransport, SendError> {
        let credentials = Credentials::new(
            self.config.username.clone(),
            self.config.password.expose_secret().clone(),
        );

        let transport = if self.config.use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
        } else {
            SmtpTransport::relay(&self.config.smtp_host)
        }
        .map_err(|e| SendError::Transient(format!("Failed to create SMTP transport: {}", e)))?
        .port(self.config.smtp_port)
        .credentials(credentials)
        .timeout(Some(Duration::from_secs(self.config.timeout_secs)))
        .build();

        Ok(transport)
    }

    /// 构建邮件消息
    fn build_message(&self, to: &str, subject: &str, html_body: &str) -> Result<Message, SendError> {
        if !EmailAddress::is_valid(to) {
            return Err(SendError::Permanent(format!("Invalid to address: {}", to)));
        }

        let from = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .map_err(|e| SendError::Permanent(format!("Invalid from address: {}", e)))?;

        let to = to
            .parse()
            .map_err(|e| SendError::Permanent(format!("Invalid to address: {}", e)))?;

        // HTML + 纯文本备用
        let body = MultiPart::alternative()
            .singlepart(
                SinglePart::builder()
                    .header(header::ContentType::TEXT_PLAIN)
                    .body(html_body.to_string()),
            )
            .singlepart(
                SinglePart::builder()
                    .header(header::ContentType::TEXT_HTML)
                    .body(html_body.to_string()),
            );

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .multipart(body)
            .map_err(|e| SendError::Permanent(format!("Failed to build message: {}", e)))?;

        Ok(message)
    }

    /// 发送邮件
    async fn send_message(&self, message: Message) -> Result<(), SendError> {
        let transport = self.build_transport()?;

        // 在 tokio 的 blocking 线程池中执行同步传输
        tokio::task::spawn_blocking(move || {
            transport.send(&message).map(|_| ()).map_err(classify_smtp_error)
        })
        .await
        .map_err(|e| SendError::Transient(format!("Task join error: {}", e)))??;

        Ok(())
    }
}

/// SMTP 错误分类
///
/// 5xx 响应码是永久失败；4xx 和连接层错误可望重试成功
fn classify_smtp_error(e: lettre::transport::smtp::Error) -> SendError {
    if e.is_permanent() {
        SendError::Permanent(format!("SMTP permanent failure: {}", e))
    } else {
        SendError::Transient(format!("SMTP failure: {}", e))
    }
}

#[async_trait::async_trait]
impl EmailSender for EmailClient {
    async fn send_template(
        &self,
        to: &str,
        subject: &str,
        template_name: &str,
        context: &serde_json::Value,
    ) -> Result<(), SendError> {
        debug!(to = %to, subject = %subject, template = %template_name, "Sending template email");

        let body = self.template.render(template_name, context)?;
        let message = self.build_message(to, subject, &body)?;
        self.send_message(message).await?;

        info!(to = %to, template = %template_name, "Email sent successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::Secret;

    use super::*;

    fn test_client() -> EmailClient {
        let config = EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            username: "noreply@example.com".to_string(),
            password: Secret::new("password".to_string()),
            from_email: "noreply@example.com".to_string(),
            from_name: "Mailflow".to_string(),
            use_tls: true,
            timeout_secs: 30,
            template_dir: "templates".to_string(),
        };

        let mut templates = HashMap::new();
        templates.insert(
            "user_login.html".to_string(),
            "<p>New login at {{ userLoginTime }}</p>".to_string(),
        );

        EmailClient::new(config, EmailTemplate::from_strings(templates).unwrap())
    }

    #[test]
    fn test_build_message() {
        let client = test_client();
        let result = client.build_message("user@example.com", "Subject", "<h1>Body</h1>");
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_address_is_permanent() {
        let client = test_client();
        let err = client
            .build_message("not-an-address", "Subject", "<h1>Body</h1>")
            .unwrap_err();
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_render_failure_is_permanent() {
        let client = test_client();
        let err = client
            .send_template(
                "user@example.com",
                "Subject",
                "missing.html",
                &serde_json::json!({}),
            )
            .await
            .unwrap_err();
        assert!(!err.is_transient());
    }
}
