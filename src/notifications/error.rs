//! Error types for the notification system

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NotificationError {
    #[error("Subscriber already registered: {0}")]
    DuplicateSubscriber(String),

    #[error("Notification system unavailable: {0}")]
    Synchronisation(String),
}

impl crate::core::error_handling::ContextualError for NotificationError {
    fn is_user_actionable(&self) -> bool {
        false // notification failures never block a booking
    }

    fn user_message(&self) -> Option<String> {
        None
    }
}

pub type NotificationResult<T> = Result<T, NotificationError>;
