//! Generic error handling utilities
//!
//! Lets the transport and startup code decide how much of an error to show:
//! user-actionable errors are echoed verbatim, system errors are reduced to
//! the operation context with the details pushed to debug logging.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)` phrased for the person who issued the request. System errors
/// return `None` and are reported with generic context only.
pub trait ContextualError: std::error::Error {
    /// True when the person who triggered the error can fix it themselves
    /// (bad price, occupied slot, unknown service id, ...)
    fn is_user_actionable(&self) -> bool;

    /// Message to show the user, present exactly when the error is user-actionable
    fn user_message(&self) -> Option<String>;
}

/// Log an error with a level of detail that depends on who can act on it
///
/// # Examples
/// ```rust,no_run
/// # use salonbook::core::error_handling::log_error_with_context;
/// # use salonbook::booking::api::BookingError;
/// let err = BookingError::validation("price must not be negative");
/// log_error_with_context(&err, "Adding service");
/// // Logs: "FATAL: Invalid input: price must not be negative"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => log::error!("FATAL: {}", user_msg),
        _ => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

/// Produce the line the transport shows for a failed request
pub fn describe_for_user<E: ContextualError>(error: &E, operation_context: &str) -> String {
    if error.is_user_actionable() {
        if let Some(message) = error.user_message() {
            return message;
        }
    }
    log::debug!("{} failed: {}", operation_context, error);
    format!("{} failed, please try again later", operation_context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct TestUserError {
        message: String,
    }

    impl fmt::Display for TestUserError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.message)
        }
    }

    impl std::error::Error for TestUserError {}

    impl ContextualError for TestUserError {
        fn is_user_actionable(&self) -> bool {
            true
        }

        fn user_message(&self) -> Option<String> {
            Some(self.message.clone())
        }
    }

    #[derive(Debug)]
    struct TestSystemError;

    impl fmt::Display for TestSystemError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "lock poisoned")
        }
    }

    impl std::error::Error for TestSystemError {}

    impl ContextualError for TestSystemError {
        fn is_user_actionable(&self) -> bool {
            false
        }

        fn user_message(&self) -> Option<String> {
            None
        }
    }

    #[test]
    fn test_user_error_is_echoed() {
        let error = TestUserError {
            message: "Slot 14:00 is taken".to_string(),
        };
        assert_eq!(describe_for_user(&error, "Booking"), "Slot 14:00 is taken");
    }

    #[test]
    fn test_system_error_hides_details() {
        let described = describe_for_user(&TestSystemError, "Booking");
        assert_eq!(described, "Booking failed, please try again later");
        assert!(!described.contains("poisoned"));
    }
}
