//! User-facing wording for use-case failures.

use shared::error::{AppError, FailureKind};

pub const NETWORK_MESSAGE: &str =
    "No internet connection. Check your network and try again.";
pub const TIMEOUT_MESSAGE: &str = "The request timed out. Please try again.";
pub const GENERIC_MESSAGE: &str = "Something went wrong. Please try again later.";

pub fn user_message(err: &AppError) -> String {
    match err.kind {
        FailureKind::Network => NETWORK_MESSAGE.to_string(),
        FailureKind::Timeout => TIMEOUT_MESSAGE.to_string(),
        FailureKind::Validation if !err.message.trim().is_empty() => err.message.clone(),
        FailureKind::Validation | FailureKind::Io | FailureKind::Unknown => {
            GENERIC_MESSAGE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_by_kind_not_by_wording() {
        let err = AppError::new(FailureKind::Timeout, "gateway said hello");
        assert_eq!(user_message(&err), TIMEOUT_MESSAGE);

        let err = AppError::new(FailureKind::Unknown, "network timeout");
        assert_eq!(user_message(&err), GENERIC_MESSAGE);
    }

    #[test]
    fn validation_detail_is_shown_verbatim() {
        let err = AppError::validation("invalid email address 'x'");
        assert_eq!(user_message(&err), "invalid email address 'x'");
        assert_eq!(user_message(&AppError::validation("  ")), GENERIC_MESSAGE);
    }

    #[test]
    fn io_failures_fall_back_to_generic_message() {
        assert_eq!(user_message(&AppError::io("disk full")), GENERIC_MESSAGE);
        assert_eq!(
            user_message(&AppError::from_message("Network is down")),
            NETWORK_MESSAGE
        );
    }
}
