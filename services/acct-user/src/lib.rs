//! acct-user Service - 账号生命周期与事件发布
//!
//! 注册、验证码生命周期、登录认证，以及向下游通知服务
//! 发布账号事件。HTTP/gRPC 接入层由上层组装，不在本 crate 内。

pub mod application;
pub mod domain;
pub mod infrastructure;
