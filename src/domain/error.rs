//! Validation Error Types
//!
//! Local, synchronous field errors. They never involve the network and are
//! always recoverable by correcting input on the current step.

use thiserror::Error;

/// Field-level validation failures raised by step gates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A field does not match its expected format
    #[error("Invalid format for {field}: {reason}")]
    InvalidFormat { field: &'static str, reason: String },

    /// Two fields that must be equal are not
    #[error("{field} does not match {other}")]
    Mismatch {
        field: &'static str,
        other: &'static str,
    },

    /// A value is shorter than allowed
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    /// A numeric value lies outside its allowed range
    #[error("{field} out of range: {value} (allowed {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: String,
        min: i64,
        max: i64,
    },

    /// Removing a medication slot would drop the list below its floor
    #[error("Medication list cannot shrink below {minimum} entries")]
    MedicationFloor { minimum: usize },

    /// Index does not address an existing entry
    #[error("No {field} entry at index {index}")]
    NoSuchEntry { field: &'static str, index: usize },

    /// Condition name is not part of the offered checklist
    #[error("Unknown condition: {0}")]
    UnknownCondition(String),

    /// Detail edit for a condition that is not currently checked
    #[error("Condition not selected: {0}")]
    ConditionNotSelected(String),

    /// Referral identifier has not been confirmed by the lookup
    #[error("Referral has not been validated")]
    ReferralNotValidated,

    /// Guardian did not accept the consent declaration
    #[error("Parent consent has not been accepted")]
    ConsentNotAccepted,

    /// Signature surface is empty
    #[error("Signature is required")]
    SignatureMissing,

    /// Liability declaration not accepted
    #[error("Liability declaration has not been accepted")]
    LiabilityNotAccepted,
}

impl ValidationError {
    /// Create an invalid format error
    pub fn invalid_format(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the field the error is attached to, if any
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField(field)
            | Self::InvalidFormat { field, .. }
            | Self::Mismatch { field, .. }
            | Self::TooShort { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::NoSuchEntry { field, .. } => Some(*field),
            Self::MedicationFloor { .. } => Some("prescribed_medications"),
            Self::UnknownCondition(_) | Self::ConditionNotSelected(_) => {
                Some("medical_conditions")
            }
            Self::ReferralNotValidated => Some("referral_code_or_name"),
            Self::ConsentNotAccepted => Some("consent_accepted"),
            Self::SignatureMissing => Some("signature"),
            Self::LiabilityNotAccepted => Some("liability_accepted"),
        }
    }

    /// Check if this error blocks step advancement (as opposed to rejecting
    /// a single edit such as removing a medication slot)
    pub fn is_gate_failure(&self) -> bool {
        !matches!(
            self,
            Self::MedicationFloor { .. }
                | Self::NoSuchEntry { .. }
                | Self::UnknownCondition(_)
                | Self::ConditionNotSelected(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_error() {
        let err = ValidationError::MissingField("email");

        assert_eq!(err.field(), Some("email"));
        assert!(err.is_gate_failure());
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn test_out_of_range_message() {
        let err = ValidationError::OutOfRange {
            field: "year_of_onset",
            value: "1899".to_string(),
            min: 1900,
            max: 2026,
        };

        assert!(err.to_string().contains("1899"));
        assert!(err.to_string().contains("1900"));
    }

    #[test]
    fn test_medication_floor_is_not_gate_failure() {
        let err = ValidationError::MedicationFloor { minimum: 3 };

        assert!(!err.is_gate_failure());
        assert_eq!(err.field(), Some("prescribed_medications"));
    }
}
