mod account_event_publisher;

pub use account_event_publisher::AccountEventPublisher;
