//! Error handling module
//!
//! Centralized error type returned by the wizard, its steps and the
//! collaborator clients.

use crate::clients::{ClientError, RegistrationFailure};
use crate::domain::ValidationError;
use crate::wizard::StepId;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Local errors (input or navigation)
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("A request for step {0} is already in flight")]
    Busy(StepId),

    #[error("Step {0} is not waiting for a response")]
    NotAwaiting(StepId),

    #[error("Update for step {update} does not match active step {active}")]
    StepMismatch { active: StepId, update: StepId },

    #[error("Submission is only possible from the review step (active: {0})")]
    NotAtReview(StepId),

    #[error("Step {0} has not been completed")]
    IncompleteStep(StepId),

    #[error("Enrollment has already been submitted")]
    AlreadySubmitted,

    // Collaborator errors
    #[error("Lookup failed: {0}")]
    Lookup(#[from] ClientError),

    #[error("Registration failed: {0}")]
    Submission(#[from] RegistrationFailure),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl AppError {
    /// Check if the user can retry the same action without changing input
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Lookup(_) | AppError::Busy(_) => true,
            AppError::Submission(failure) => failure.is_retryable(),
            _ => false,
        }
    }

    /// Check if the error was raised without contacting the network
    pub fn is_local(&self) -> bool {
        !matches!(
            self,
            AppError::Lookup(_) | AppError::Submission(_) | AppError::Config(_)
        )
    }

    /// Inline message to show on the active step
    pub fn user_message(&self) -> String {
        match self {
            AppError::Lookup(err) => err.user_message(),
            AppError::Submission(failure) => failure.message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_local_and_not_retryable() {
        let err: AppError = ValidationError::MissingField("email").into();
        assert!(err.is_local());
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Missing required field: email");
    }

    #[test]
    fn test_lookup_is_retryable() {
        let err: AppError = ClientError::Status {
            status: 503,
            message: Some("maintenance".to_string()),
        }
        .into();
        assert!(err.is_retryable());
        assert!(!err.is_local());
        assert_eq!(err.user_message(), "maintenance");
    }

    #[test]
    fn test_incomplete_step_is_local() {
        let err = AppError::IncompleteStep(StepId::ParentConsent);
        assert!(err.is_local());
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Step parent_consent has not been completed");
    }

    #[test]
    fn test_step_mismatch_message() {
        let err = AppError::StepMismatch {
            active: StepId::HowFoundUs,
            update: StepId::ParentConsent,
        };
        assert_eq!(
            err.to_string(),
            "Update for step parent_consent does not match active step how_found_us"
        );
    }
}
