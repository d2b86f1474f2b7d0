pub mod events;
pub mod notification;
pub mod repository;
pub mod templates;

pub use events::{LoginEvent, RegistrationEvent};
pub use notification::{NotificationRecord, NotificationType};
pub use repository::NotificationStore;
pub use templates::EmailTemplates;
