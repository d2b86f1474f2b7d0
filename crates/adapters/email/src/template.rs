//! 邮件模板系统

use std::collections::HashMap;

use mailflow_errors::SendError;
use tera::Tera;
use tracing::debug;

/// 邮件模板管理器
///
/// 渲染失败是永久性错误：同一模板和变量重试不会成功
pub struct EmailTemplate {
    tera: Tera,
}

impl EmailTemplate {
    /// 从模板目录创建
    pub fn new(template_dir: &str) -> Result<Self, SendError> {
        let pattern = format!("{}/**/*.html", template_dir);
        let tera = Tera::new(&pattern)
            .map_err(|e| SendError::Permanent(format!("Failed to load email templates: {}", e)))?;

        debug!(template_dir = %template_dir, "Email templates loaded");

        Ok(Self { tera })
    }

    /// 从内存中的模板字符串创建（用于测试）
    pub fn from_strings(templates: HashMap<String, String>) -> Result<Self, SendError> {
        let mut tera = Tera::default();

        for (name, content) in templates {
            tera.add_raw_template(&name, &content).map_err(|e| {
                SendError::Permanent(format!("Failed to add template {}: {}", name, e))
            })?;
        }

        Ok(Self { tera })
    }

    /// 渲染模板
    pub fn render(
        &self,
        template_name: &str,
        context: &serde_json::Value,
    ) -> Result<String, SendError> {
        let context = tera::Context::from_serialize(context).map_err(|e| {
            SendError::Permanent(format!("Failed to create template context: {}", e))
        })?;

        self.tera.render(template_name, &context).map_err(|e| {
            SendError::Permanent(format!("Failed to render template {}: {}", template_name, e))
        })
    }
}
