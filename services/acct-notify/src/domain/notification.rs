//! 通知记录实体

use chrono::NaiveDateTime;
use uuid::Uuid;

/// 通知类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    UserVerification,
    UserLogin,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::UserVerification => "USER_VERIFICATION",
            NotificationType::UserLogin => "USER_LOGIN",
        }
    }
}

/// 通知记录
///
/// 每次投递尝试一条，只追加，本服务不修改也不删除。
/// broker 重投递产生的重复尝试会合法地产生重复记录。
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRecord {
    pub id: Uuid,
    pub notification_type: NotificationType,
    pub sent_at: NaiveDateTime,
}

impl NotificationRecord {
    pub fn new(notification_type: NotificationType, sent_at: NaiveDateTime) -> Self {
        Self {
            id: Uuid::now_v7(),
            notification_type,
            sent_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_record_ids_are_unique() {
        let now = Utc::now().naive_utc();
        let a = NotificationRecord::new(NotificationType::UserVerification, now);
        let b = NotificationRecord::new(NotificationType::UserVerification, now);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_type_rendering() {
        assert_eq!(NotificationType::UserVerification.as_str(), "USER_VERIFICATION");
        assert_eq!(NotificationType::UserLogin.as_str(), "USER_LOGIN");
    }
}
