//! acct-notify Service - 账号事件消费与邮件投递
//!
//! 消费账号事件，先落通知记录再发邮件，按结果确认或触发重投递。

pub mod application;
pub mod domain;
pub mod infrastructure;
