//! acct-notify Service - 账号事件消费与邮件投递

use std::sync::Arc;
use std::time::Duration;

use mailflow_adapter_email::{EmailClient, EmailTemplate};
use mailflow_adapter_kafka::{ConsumerConfig, KafkaEventConsumer};
use mailflow_common::RetryConfig;
use mailflow_config::AppConfig;
use mailflow_telemetry::{init_tracing, init_tracing_json};
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};

use acct_notify::application::NotificationDispatcher;
use acct_notify::domain::events::{USER_CONFIRMATION_TOPIC, USER_LOGIN_TOPIC};
use acct_notify::infrastructure::persistence::PostgresNotificationStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load("config")?;

    if config.is_production() {
        init_tracing_json(&config.telemetry.log_level);
    } else {
        init_tracing(&config.telemetry.log_level);
    }

    info!(app = %config.app_name, env = %config.app_env, "Starting acct-notify");

    let database = config
        .database
        .as_ref()
        .ok_or("database configuration is required")?;
    let pool = PgPoolOptions::new()
        .max_connections(database.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database.url.expose_secret())
        .await?;
    let store = Arc::new(PostgresNotificationStore::new(pool));
    info!("Notification store initialized");

    let email_config = config
        .email
        .clone()
        .ok_or("email configuration is required")?;
    let templates = EmailTemplate::new(&email_config.template_dir)?;
    let sender = Arc::new(EmailClient::new(email_config, templates));
    info!("Email client initialized");

    let dispatcher = Arc::new(NotificationDispatcher::new(store, sender));

    let backoff = RetryConfig::new(
        config.consumer.max_redeliveries,
        Duration::from_millis(config.consumer.redelivery_delay_ms),
        Duration::from_secs(30),
    );

    // 两类事件是相互独立的管道，各自一个消费者并发运行
    let confirmation_consumer = KafkaEventConsumer::new(
        ConsumerConfig::new(&config.kafka.brokers, &config.kafka.group_id)
            .with_topic(USER_CONFIRMATION_TOPIC)
            .with_max_redeliveries(config.consumer.max_redeliveries)
            .with_redelivery_backoff(backoff.clone()),
    )?;
    let login_consumer = KafkaEventConsumer::new(
        ConsumerConfig::new(&config.kafka.brokers, &config.kafka.group_id)
            .with_topic(USER_LOGIN_TOPIC)
            .with_max_redeliveries(config.consumer.max_redeliveries)
            .with_redelivery_backoff(backoff),
    )?;

    let confirmation_dispatcher = Arc::clone(&dispatcher);
    let mut confirmation_worker = tokio::spawn(async move {
        confirmation_consumer
            .run(move |message| {
                let dispatcher = Arc::clone(&confirmation_dispatcher);
                async move { dispatcher.handle_confirmation(message).await }
            })
            .await
    });

    let login_dispatcher = Arc::clone(&dispatcher);
    let mut login_worker = tokio::spawn(async move {
        login_consumer
            .run(move |message| {
                let dispatcher = Arc::clone(&login_dispatcher);
                async move { dispatcher.handle_login(message).await }
            })
            .await
    });

    // 关停时直接丢弃消费任务：处理中的消息保持未确认，重启后由 broker 重投递
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        result = &mut confirmation_worker => {
            error!(?result, "Confirmation consumer exited unexpectedly");
        }
        result = &mut login_worker => {
            error!(?result, "Login consumer exited unexpectedly");
        }
    }

    confirmation_worker.abort();
    login_worker.abort();
    info!("acct-notify stopped");

    Ok(())
}
