//! 分发器处理序列测试：记录先行、结果分类、重投递语义

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use acct_notify::application::NotificationDispatcher;
use acct_notify::domain::events::USER_CONFIRMATION_TOPIC;
use acct_notify::domain::{
    LoginEvent, NotificationRecord, NotificationStore, NotificationType, RegistrationEvent,
};
use acct_notify::infrastructure::persistence::InMemoryNotificationStore;
use mailflow_adapter_email::EmailSender;
use mailflow_adapter_kafka::{ConsumedMessage, MessageAction, action_for};
use mailflow_errors::{SendError, StoreError};
use mailflow_ports::DispatchOutcome;

/// 记录调用并按脚本返回结果的邮件发送器
#[derive(Default)]
struct ScriptedSender {
    /// 每次调用弹出一个结果；脚本耗尽后始终成功
    script: Mutex<VecDeque<Result<(), SendError>>>,
    calls: Mutex<Vec<(String, String, String, serde_json::Value)>>,
}

impl ScriptedSender {
    fn with_script(script: Vec<Result<(), SendError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(String, String, String, serde_json::Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for ScriptedSender {
    async fn send_template(
        &self,
        to: &str,
        subject: &str,
        template_name: &str,
        context: &serde_json::Value,
    ) -> Result<(), SendError> {
        self.calls.lock().unwrap().push((
            to.to_string(),
            subject.to_string(),
            template_name.to_string(),
            context.clone(),
        ));
        self.script.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

/// 写入始终失败的存储
struct UnavailableStore;

#[async_trait]
impl NotificationStore for UnavailableStore {
    async fn save(&self, _record: &NotificationRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("pool timeout".to_string()))
    }
}

fn registration_event() -> RegistrationEvent {
    RegistrationEvent {
        user_id: Uuid::now_v7(),
        email: "a@x.com".to_string(),
        verification_code: "A1b2C3d4E5f6G7h8".to_string(),
        verification_code_expiration: NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 5, 0)
            .unwrap(),
    }
}

fn login_event() -> LoginEvent {
    LoginEvent {
        user_id: Uuid::now_v7(),
        email: "b@x.com".to_string(),
        user_login_time: NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(9, 30, 15)
            .unwrap(),
    }
}

#[tokio::test]
async fn registration_dispatch_records_then_sends() {
    let store = Arc::new(InMemoryNotificationStore::new());
    let sender = Arc::new(ScriptedSender::default());
    let dispatcher = NotificationDispatcher::new(store.clone(), sender.clone());

    let outcome = dispatcher.dispatch_registration(&registration_event()).await;
    assert_eq!(outcome, DispatchOutcome::Sent);

    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].notification_type, NotificationType::UserVerification);

    let calls = sender.calls();
    assert_eq!(calls.len(), 1);
    let (to, subject, template, context) = &calls[0];
    assert_eq!(to, "a@x.com");
    assert_eq!(subject, "User Verification Successful");
    assert_eq!(template, "user_verification.html");
    assert_eq!(context["verificationCode"], "A1b2C3d4E5f6G7h8");
    assert_eq!(context["verificationCodeExpiration"], "2024-06-01T12:05:00");
}

#[tokio::test]
async fn login_dispatch_records_then_sends() {
    let store = Arc::new(InMemoryNotificationStore::new());
    let sender = Arc::new(ScriptedSender::default());
    let dispatcher = NotificationDispatcher::new(store.clone(), sender.clone());

    let outcome = dispatcher.dispatch_login(&login_event()).await;
    assert_eq!(outcome, DispatchOutcome::Sent);

    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].notification_type, NotificationType::UserLogin);

    let calls = sender.calls();
    assert_eq!(calls[0].2, "user_login.html");
    assert_eq!(calls[0].3["userLoginTime"], "2024-06-01T09:30:15");
}

#[tokio::test]
async fn transient_failures_then_success_leave_one_record_per_attempt() {
    let store = Arc::new(InMemoryNotificationStore::new());
    let sender = Arc::new(ScriptedSender::with_script(vec![
        Err(SendError::Transient("transport unreachable".to_string())),
        Err(SendError::Transient("transport unreachable".to_string())),
        Err(SendError::Transient("transport unreachable".to_string())),
        Ok(()),
    ]));
    let dispatcher = NotificationDispatcher::new(store.clone(), sender.clone());
    let event = registration_event();

    // broker 重投递 == 完整重跑处理序列
    let mut outcomes = Vec::new();
    for _ in 0..4 {
        outcomes.push(dispatcher.dispatch_registration(&event).await);
    }

    assert!(matches!(outcomes[0], DispatchOutcome::TransientFailure(_)));
    assert!(matches!(outcomes[1], DispatchOutcome::TransientFailure(_)));
    assert!(matches!(outcomes[2], DispatchOutcome::TransientFailure(_)));
    assert_eq!(outcomes[3], DispatchOutcome::Sent);

    // 每次尝试恰好一条记录：三次瞬时失败 + 一次成功 = 四条
    assert_eq!(store.records().len(), 4);
    // 成功的邮件只有最后一次
    assert_eq!(sender.calls().len(), 4);

    // 消费循环对这组结果的决策：三次 seek 重投递，最后提交
    for (attempt, outcome) in outcomes.iter().take(3).enumerate() {
        assert_eq!(action_for(outcome, attempt as u32, 5), MessageAction::SeekRetry);
    }
    assert_eq!(action_for(&outcomes[3], 3, 5), MessageAction::Commit);
}

#[tokio::test]
async fn permanent_failure_is_terminal_after_one_attempt() {
    let store = Arc::new(InMemoryNotificationStore::new());
    let sender = Arc::new(ScriptedSender::with_script(vec![Err(SendError::Permanent(
        "mailbox does not exist".to_string(),
    ))]));
    let dispatcher = NotificationDispatcher::new(store.clone(), sender.clone());

    let outcome = dispatcher.dispatch_registration(&registration_event()).await;
    assert!(matches!(outcome, DispatchOutcome::PermanentFailure(_)));

    // 一次尝试、一条记录，且消息直接进 DLQ 并提交，不再重投递
    assert_eq!(store.records().len(), 1);
    assert_eq!(sender.calls().len(), 1);
    assert_eq!(action_for(&outcome, 0, 5), MessageAction::DlqCommit);
}

#[tokio::test]
async fn store_failure_skips_send_and_requests_redelivery() {
    let sender = Arc::new(ScriptedSender::default());
    let dispatcher = NotificationDispatcher::new(Arc::new(UnavailableStore), sender.clone());

    let outcome = dispatcher.dispatch_registration(&registration_event()).await;
    assert!(matches!(outcome, DispatchOutcome::TransientFailure(_)));

    // 记录未落地就不发邮件
    assert!(sender.calls().is_empty());
}

#[tokio::test]
async fn redelivering_k_times_produces_exactly_k_records() {
    let store = Arc::new(InMemoryNotificationStore::new());
    let sender = Arc::new(ScriptedSender::default());
    let dispatcher = NotificationDispatcher::new(store.clone(), sender.clone());
    let event = registration_event();

    // 至少一次投递下的幂等边界：不做去重，K 次重投递 == K 条记录
    for _ in 0..5 {
        assert_eq!(dispatcher.dispatch_registration(&event).await, DispatchOutcome::Sent);
    }

    assert_eq!(store.records().len(), 5);
    assert_eq!(sender.calls().len(), 5);
}

#[tokio::test]
async fn malformed_payload_is_a_permanent_failure() {
    let store = Arc::new(InMemoryNotificationStore::new());
    let sender = Arc::new(ScriptedSender::default());
    let dispatcher = NotificationDispatcher::new(store.clone(), sender.clone());

    let message = ConsumedMessage {
        topic: USER_CONFIRMATION_TOPIC.to_string(),
        partition: 0,
        offset: 7,
        key: None,
        payload: "{not json".to_string(),
        timestamp: None,
    };

    let outcome = dispatcher.handle_confirmation(message).await;
    assert!(matches!(outcome, DispatchOutcome::PermanentFailure(_)));

    // 解析失败发生在处理序列之前：没有记录，也没有发送
    assert!(store.records().is_empty());
    assert!(sender.calls().is_empty());
}

#[tokio::test]
async fn well_formed_message_flows_through_handler() {
    let store = Arc::new(InMemoryNotificationStore::new());
    let sender = Arc::new(ScriptedSender::default());
    let dispatcher = NotificationDispatcher::new(store.clone(), sender.clone());

    let message = ConsumedMessage {
        topic: USER_CONFIRMATION_TOPIC.to_string(),
        partition: 0,
        offset: 8,
        key: Some("0190e1a0-0000-7000-8000-000000000001".to_string()),
        payload: r#"{"userId":"0190e1a0-0000-7000-8000-000000000001","email":"a@x.com","verificationCode":"A1b2C3d4E5","verificationCodeExpiration":"2024-06-01T12:05:00"}"#.to_string(),
        timestamp: None,
    };

    let outcome = dispatcher.handle_confirmation(message).await;
    assert_eq!(outcome, DispatchOutcome::Sent);
    assert_eq!(store.records().len(), 1);
}
