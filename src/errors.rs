use axum::http::StatusCode;

use crate::services::datetime::NormalizationError;

pub const NOT_SURE_MESSAGE: &str = "I'm not sure how to help with that.";
pub const QUESTION_FAILED_MESSAGE: &str = "Sorry, I had trouble understanding that.";
pub const BOOKING_INCOMPLETE_MESSAGE: &str =
    "I need both name and date/time to schedule your appointment.";
pub const BOOKING_SENT_MESSAGE: &str = "Thanks! I've sent your appointment request.";
pub const BOOKING_FAILED_MESSAGE: &str =
    "I couldn't send the appointment request. Please try again.";

/// Everything that can stop a fulfillment short of its happy path. None of
/// these reach the platform as a fault: each maps to a fixed reply.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("no caller text to answer")]
    MissingQuestion,

    #[error("booking has no caller name")]
    MissingName,

    #[error("booking datetime rejected: {0}")]
    Datetime(#[from] NormalizationError),

    #[error("AI provider error: {0:#}")]
    Ai(anyhow::Error),

    #[error("booking relay error: {0:#}")]
    Relay(anyhow::Error),
}

impl AppError {
    pub fn caller_message(&self) -> &'static str {
        match self {
            AppError::MissingQuestion => NOT_SURE_MESSAGE,
            AppError::MissingName | AppError::Datetime(_) => BOOKING_INCOMPLETE_MESSAGE,
            AppError::Ai(_) => QUESTION_FAILED_MESSAGE,
            AppError::Relay(_) => BOOKING_FAILED_MESSAGE,
        }
    }

    /// Transport status for this failure. Only a language-model failure may
    /// leave 200, and only as configured.
    pub fn status(&self, llm_failure_status: StatusCode) -> StatusCode {
        match self {
            AppError::Ai(_) => llm_failure_status,
            _ => StatusCode::OK,
        }
    }
}
