//! 账号应用服务
//!
//! 注册、登录、验证码验证与补发、登出。
//! 注册路径的事件发布是同步的，发布失败即注册失败；
//! 登录路径的事件发布是尽力而为的。

use std::sync::Arc;

use chrono::Utc;
use mailflow_common::UserId;
use mailflow_errors::{AppError, AppResult};
use mailflow_ports::TokenRevocationSet;
use tracing::{debug, info, warn};

use crate::domain::events::{LoginEvent, RegistrationEvent};
use crate::domain::{CodeGenerator, Email, PasswordHasher, TokenIssuer, User, UserRepository};
use crate::infrastructure::events::AccountEventPublisher;

/// 注册请求
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// 用户视图
#[derive(Debug, Clone)]
pub struct UserDto {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub enabled: bool,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username.clone(),
            email: user.email.to_string(),
            enabled: user.enabled,
        }
    }
}

/// 登录结果
#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub user_id: UserId,
    pub token: String,
}

/// 账号应用服务
pub struct UserAccountService {
    repo: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
    revoked: Arc<dyn TokenRevocationSet>,
    generator: CodeGenerator,
    events: AccountEventPublisher,
}

impl UserAccountService {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
        revoked: Arc<dyn TokenRevocationSet>,
        generator: CodeGenerator,
        events: AccountEventPublisher,
    ) -> Self {
        Self {
            repo,
            hasher,
            tokens,
            revoked,
            generator,
            events,
        }
    }

    /// 注册新账号并同步发布注册事件
    pub async fn register(&self, request: RegisterRequest) -> AppResult<UserDto> {
        let email = Email::new(&request.email)?;

        if self.repo.exists_by_username(&request.username).await? {
            return Err(AppError::conflict("Username already exists"));
        }
        if self.repo.exists_by_email(email.as_str()).await? {
            return Err(AppError::conflict("Email already exists"));
        }

        let now = Utc::now();
        let password_hash = self.hasher.hash(&request.password)?;
        let code = self.generator.generate(now);
        let code_value = code.value.clone();
        let code_expiration = code.expires_at.naive_utc();

        let user = User::new(&request.username, email, password_hash, code, now);
        self.repo.save(&user).await?;

        let event = RegistrationEvent {
            user_id: user.user_id.as_uuid(),
            email: user.email.to_string(),
            verification_code: code_value,
            verification_code_expiration: code_expiration,
        };
        // 发布失败向上传播：没有至少一次通知尝试，注册不算完成
        self.events.publish_registration(&event).await?;

        info!(user_id = %user.user_id, "User registered");
        Ok(UserDto::from(&user))
    }

    /// 登录并尽力而为地发布登录事件
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginResponse> {
        let user = self
            .repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

        if !self.hasher.verify(password, &user.password_hash)? {
            return Err(AppError::unauthorized("Invalid credentials"));
        }

        let issued = self.tokens.issue(&user.user_id)?;

        self.events.publish_login_detached(LoginEvent {
            user_id: user.user_id.as_uuid(),
            email: user.email.to_string(),
            user_login_time: Utc::now().naive_utc(),
        });

        info!(user_id = %user.user_id, "User logged in");
        Ok(LoginResponse {
            user_id: user.user_id,
            token: issued.token,
        })
    }

    /// 用验证码完成账号验证
    pub async fn verify(&self, email: &str, code: &str) -> AppResult<UserDto> {
        let mut user = self
            .repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        if !user.apply_verification(code, Utc::now()) {
            warn!(user_id = %user.user_id, "Verification attempt rejected");
            return Err(AppError::validation("Invalid or expired verification code"));
        }

        self.repo.save(&user).await?;

        info!(user_id = %user.user_id, "User verified");
        Ok(UserDto::from(&user))
    }

    /// 补发验证码：覆盖在档验证码并重新发布注册事件
    pub async fn resend_code(&self, email: &str) -> AppResult<()> {
        let mut user = self
            .repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let code = self.generator.generate(Utc::now());
        let code_value = code.value.clone();
        let code_expiration = code.expires_at.naive_utc();
        user.set_verification_code(code);
        self.repo.save(&user).await?;

        let event = RegistrationEvent {
            user_id: user.user_id.as_uuid(),
            email: user.email.to_string(),
            verification_code: code_value,
            verification_code_expiration: code_expiration,
        };
        self.events.publish_registration(&event).await?;

        info!(user_id = %user.user_id, "Verification code reissued");
        Ok(())
    }

    /// 登出：吊销令牌，TTL 为令牌剩余有效期
    pub async fn logout(&self, token: &str) -> AppResult<()> {
        let claims = match self.tokens.validate(token) {
            Ok(claims) => claims,
            Err(e) => {
                // 无效令牌没有可吊销的身份
                debug!(error = %e, "Logout with invalid token");
                return Ok(());
            }
        };

        let remaining = (claims.expires_at - Utc::now())
            .to_std()
            .unwrap_or_default();
        self.revoked.revoke(&claims.token_id, remaining).await;

        info!(user_id = %claims.user_id, "Token revoked");
        Ok(())
    }

    /// 校验令牌：已吊销的令牌视为无效
    pub async fn validate_token(&self, token: &str) -> bool {
        match self.tokens.validate(token) {
            Ok(claims) => !self.revoked.is_revoked(&claims.token_id).await,
            Err(_) => false,
        }
    }
}
