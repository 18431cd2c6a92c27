//! Collaborator clients
//!
//! Traits for the three backend collaborators the wizard consults, the
//! shapes they exchange and their error types. `http` holds the `reqwest`
//! implementation; tests substitute in-memory fakes.

pub mod http;
pub mod payload;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::aggregate::{AgeVerdict, EnrollmentAggregate};
use crate::domain::validators::{self, MIN_REFERRAL_LENGTH};
use crate::domain::SessionContext;

pub use http::BackendClient;
pub use payload::RegistrationPayload;

// =========================================================================
// Collaborator traits
// =========================================================================

/// Server-side age verification; the only authority for `is_minor`
#[async_trait]
pub trait AgeVerifier: Send + Sync {
    async fn check_age(
        &self,
        ctx: &SessionContext,
        birth_date: NaiveDate,
    ) -> Result<AgeVerdict, ClientError>;
}

/// Checks whether an identifier names an existing member
#[async_trait]
pub trait ReferralLookup: Send + Sync {
    async fn check_referral(
        &self,
        ctx: &SessionContext,
        identifier: &str,
    ) -> Result<ReferralCheck, ClientError>;
}

/// Receives the completed aggregate
#[async_trait]
pub trait RegistrationService: Send + Sync {
    async fn register(
        &self,
        ctx: &SessionContext,
        aggregate: &EnrollmentAggregate,
    ) -> Result<RegistrationReceipt, RegistrationFailure>;
}

// =========================================================================
// Wire shapes
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeCheckRequest {
    pub birth_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeCheckResponse {
    pub is_minor: bool,
    pub age: u32,
    pub server_date: NaiveDate,
}

impl From<AgeCheckResponse> for AgeVerdict {
    fn from(response: AgeCheckResponse) -> Self {
        AgeVerdict::new(response.is_minor, response.age, response.server_date)
    }
}

/// Referral lookup outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralCheck {
    pub is_valid: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer_id: Option<i64>,
}

impl ReferralCheck {
    pub fn valid(message: impl Into<String>, referrer_id: Option<i64>) -> Self {
        Self {
            is_valid: true,
            message: message.into(),
            referrer_id,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
            referrer_id: None,
        }
    }
}

/// Answer a referral identifier locally when no lookup can succeed.
///
/// Returns `None` for a normalized mobile number, which needs the backend.
pub fn precheck_referral(identifier: &str) -> Option<ReferralCheck> {
    if identifier.trim().chars().count() < MIN_REFERRAL_LENGTH {
        return Some(ReferralCheck::invalid(format!(
            "Please enter at least {} characters",
            MIN_REFERRAL_LENGTH
        )));
    }
    if !validators::is_mobile_number(identifier) {
        return Some(ReferralCheck::invalid(
            "Enter the mobile number your referrer registered with (69xxxxxxxx)",
        ));
    }
    None
}

/// Acknowledgment of a successful registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationReceipt {
    pub user_id: i64,
    pub status: String,
    pub message: String,
}

// =========================================================================
// Errors
// =========================================================================

/// Failure of an age or referral lookup. Always retryable.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server returned status {status}")]
    Status { status: u16, message: Option<String> },

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl ClientError {
    /// Inline message for the step that issued the call
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            ClientError::Transport(_) => {
                "Could not reach the server. Please try again.".to_string()
            }
            _ => "Verification failed. Please try again.".to_string(),
        }
    }
}

/// Structured registration failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RegistrationFailure {
    /// HTTP status, absent when the request never got a response
    pub status: Option<u16>,
    pub message: String,
    /// Per-field messages keyed by wire field name
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl RegistrationFailure {
    /// Failure without a server response
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            field_errors: BTreeMap::new(),
        }
    }

    /// Transport failures, rate limiting and server errors may succeed on
    /// an identical retry; validation rejections will not.
    pub fn is_retryable(&self) -> bool {
        match self.status {
            None => true,
            Some(status) => status == 429 || status >= 500,
        }
    }
}
