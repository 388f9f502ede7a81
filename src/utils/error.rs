use crate::core::details::FieldErrors;
use crate::domain::model::ClientId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API responded with {status}: {message}")]
    ApiResponseError { status: u16, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Customer details are invalid: {0}")]
    InvalidDetails(FieldErrors),

    #[error("No client with id {client_id}")]
    InvalidReference { client_id: ClientId },

    #[error("Action rejected: {reason}")]
    ActionRejected { reason: String },

    #[error("Unknown {kind} '{id}'")]
    UnknownCatalogItem { kind: &'static str, id: String },

    #[error("Missing required booking information: {missing}")]
    IncompleteBooking { missing: String },

    #[error("Date {date} is in the past")]
    DateInPast { date: chrono::NaiveDate },

    #[error("We are closed on {date}")]
    DateClosed { date: chrono::NaiveDate },

    #[error("Time slot '{time}' is not available")]
    SlotUnavailable { time: String },

    #[error("A booking submission is already in progress")]
    SubmissionInProgress,

    #[error("The booking was reset before the submission finished")]
    StaleSubmission,

    #[error("This booking has already been confirmed")]
    AlreadyConfirmed,

    #[error("Catalog has not been loaded")]
    CatalogUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Api,
    Configuration,
    Validation,
    State,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl BookingError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BookingError::ApiError(_) => ErrorCategory::Network,
            BookingError::ApiResponseError { .. } => ErrorCategory::Api,
            BookingError::IoError(_) | BookingError::SerializationError(_) => ErrorCategory::System,
            BookingError::ConfigError { .. }
            | BookingError::ConfigValidationError { .. }
            | BookingError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            BookingError::InvalidDetails(_)
            | BookingError::UnknownCatalogItem { .. }
            | BookingError::IncompleteBooking { .. }
            | BookingError::DateInPast { .. }
            | BookingError::DateClosed { .. }
            | BookingError::SlotUnavailable { .. } => ErrorCategory::Validation,
            BookingError::InvalidReference { .. }
            | BookingError::ActionRejected { .. }
            | BookingError::SubmissionInProgress
            | BookingError::StaleSubmission
            | BookingError::AlreadyConfirmed
            | BookingError::CatalogUnavailable => ErrorCategory::State,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation | ErrorCategory::State => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Api => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 網路錯誤與 5xx 回應可以直接重試
    pub fn is_retryable(&self) -> bool {
        match self {
            BookingError::ApiError(_) => true,
            BookingError::ApiResponseError { status, .. } => *status >= 500 || *status == 409,
            BookingError::CatalogUnavailable => true,
            _ => false,
        }
    }

    /// 程序退出碼：任何失敗都不能回傳 0，嚴重程度越高碼越大
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 3,
            ErrorSeverity::Critical => 4,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            BookingError::ApiError(_) => "Check your network connection and try again",
            BookingError::ApiResponseError { status, .. } if *status == 409 => {
                "That time slot was just taken, pick another time"
            }
            BookingError::ApiResponseError { status, .. } if *status >= 500 => {
                "The booking service is having trouble, try again in a moment"
            }
            BookingError::ApiResponseError { .. } => "Review your booking details and resubmit",
            BookingError::IoError(_) => "Check that the file exists and is readable",
            BookingError::SerializationError(_) => "The server sent data we could not read",
            BookingError::ConfigError { .. }
            | BookingError::ConfigValidationError { .. }
            | BookingError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or the BOOKING_API_URL environment variable"
            }
            BookingError::InvalidDetails(_) => "Correct the highlighted fields",
            BookingError::InvalidReference { .. } => "Pick one of the listed clients",
            BookingError::ActionRejected { .. } => "Complete the current step first",
            BookingError::UnknownCatalogItem { .. } => "Choose an item from the current catalog",
            BookingError::IncompleteBooking { .. } => "Go back and complete the missing step",
            BookingError::DateInPast { .. } | BookingError::DateClosed { .. } => {
                "Choose another date"
            }
            BookingError::SlotUnavailable { .. } => "Choose one of the available times",
            BookingError::SubmissionInProgress => "Wait for the current submission to finish",
            BookingError::StaleSubmission => "Check your bookings before submitting again",
            BookingError::AlreadyConfirmed => "Start a new booking",
            BookingError::CatalogUnavailable => "Reload the service list",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            BookingError::ApiError(_) => {
                "Network error. Please check your connection.".to_string()
            }
            BookingError::ApiResponseError { message, .. } => message.clone(),
            BookingError::IoError(_) | BookingError::SerializationError(_) => {
                "Failed to load data. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BookingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_message_is_user_facing() {
        let err = BookingError::ApiResponseError {
            status: 409,
            message: "The selected time slot is not available".to_string(),
        };

        assert_eq!(err.category(), ErrorCategory::Api);
        assert!(err.is_retryable());
        assert_eq!(
            err.user_friendly_message(),
            "The selected time slot is not available"
        );
    }

    #[test]
    fn test_severity_follows_category() {
        let config = BookingError::ConfigError {
            message: "bad".to_string(),
        };
        assert_eq!(config.severity(), ErrorSeverity::High);

        assert_eq!(BookingError::SubmissionInProgress.severity(), ErrorSeverity::Low);
        assert!(!BookingError::AlreadyConfirmed.is_retryable());
    }

    #[test]
    fn test_every_failure_has_non_zero_exit_code() {
        let date = chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let failures = [
            BookingError::DateInPast { date },
            BookingError::SlotUnavailable {
                time: "10:00".to_string(),
            },
            BookingError::AlreadyConfirmed,
            BookingError::ActionRejected {
                reason: "blocked".to_string(),
            },
        ];
        for err in &failures {
            assert_eq!(err.severity(), ErrorSeverity::Low);
            assert_eq!(err.exit_code(), 1);
        }

        let api = BookingError::ApiResponseError {
            status: 500,
            message: "Request failed".to_string(),
        };
        assert_eq!(api.exit_code(), 2);
        assert_eq!(
            BookingError::ConfigError {
                message: "bad".to_string()
            }
            .exit_code(),
            3
        );
    }
}
