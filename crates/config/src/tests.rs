use crate::{ConsumerConfig, EmailConfig, VerificationConfig};
use secrecy::Secret;

#[test]
fn test_secret_redaction() {
    let secret = Secret::new("my_smtp_password".to_string());
    let debug_output = format!("{:?}", secret);
    assert!(debug_output.contains("Secret([REDACTED"));
    assert!(!debug_output.contains("my_smtp_password"));
}

#[test]
fn test_email_config_redaction() {
    let config = EmailConfig {
        smtp_host: "smtp.example.com".to_string(),
        smtp_port: 587,
        username: "noreply@example.com".to_string(),
        password: Secret::new("hunter2".to_string()),
        from_email: "noreply@example.com".to_string(),
        from_name: "Mailflow".to_string(),
        use_tls: true,
        timeout_secs: 30,
        template_dir: "templates".to_string(),
    };
    let debug_output = format!("{:?}", config);
    assert!(!debug_output.contains("hunter2"));
    assert!(debug_output.contains("Secret([REDACTED"));
}

#[test]
fn test_verification_defaults() {
    let config = VerificationConfig::default();
    assert_eq!(config.code_length, 16);
    assert_eq!(config.code_ttl_minutes, 5);
}

#[test]
fn test_consumer_defaults() {
    let config = ConsumerConfig::default();
    assert_eq!(config.max_redeliveries, 5);
    assert_eq!(config.redelivery_delay_ms, 500);
}
