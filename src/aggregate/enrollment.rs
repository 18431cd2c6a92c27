//! Enrollment Aggregate
//!
//! The single in-memory record accumulating everything the applicant enters
//! across the wizard. It is created empty when the wizard mounts and changes
//! only through `Aggregate::apply`.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::validators;
use crate::domain::ValidationError;

use super::consent::ParentConsent;
use super::how_found::HowFoundUs;
use super::medical::{EmergencyContact, MedicalHistory};
use super::update::StepUpdate;
use super::Aggregate;

/// Applicant gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

/// Applicant identity as collected by the basic info step
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub password_confirmation: String,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

impl Identity {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// All field errors, in display order
    pub fn errors(&self) -> Vec<ValidationError> {
        let checks = [
            validators::required("first_name", &self.first_name),
            validators::required("last_name", &self.last_name),
            validators::email(&self.email),
            validators::password_pair(&self.password, &self.password_confirmation),
            match self.birth_date {
                Some(_) => Ok(()),
                None => Err(ValidationError::MissingField("birth_date")),
            },
        ];
        checks.into_iter().filter_map(Result::err).collect()
    }

    /// First field error, if any
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.errors().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"<redacted>")
            .field("password_confirmation", &"<redacted>")
            .field("birth_date", &self.birth_date)
            .field("gender", &self.gender)
            .finish()
    }
}

/// Age verification outcome, as decided by the server clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeVerdict {
    is_minor: bool,
    age: u32,
    server_date: NaiveDate,
}

impl AgeVerdict {
    pub(crate) fn new(is_minor: bool, age: u32, server_date: NaiveDate) -> Self {
        Self {
            is_minor,
            age,
            server_date,
        }
    }

    pub fn is_minor(&self) -> bool {
        self.is_minor
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn server_date(&self) -> NaiveDate {
        self.server_date
    }
}

/// Enrollment Aggregate
///
/// # Invariants
/// - `is_minor` / `server_verified_age` come only from an `AgeVerdict`
/// - `parent_consent` is present only while `is_minor == Some(true)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentAggregate {
    /// Session this aggregate belongs to
    id: Uuid,

    /// Number of updates merged so far
    version: u64,

    identity: Identity,

    is_minor: Option<bool>,

    server_verified_age: Option<u32>,

    how_found_us: Option<HowFoundUs>,

    parent_consent: Option<ParentConsent>,

    medical: MedicalHistory,

    emergency_contact: EmergencyContact,
}

impl EnrollmentAggregate {
    /// Create an empty aggregate for a wizard session
    pub fn new(session_id: Uuid) -> Self {
        Self {
            id: session_id,
            version: 0,
            identity: Identity::default(),
            is_minor: None,
            server_verified_age: None,
            how_found_us: None,
            parent_consent: None,
            medical: MedicalHistory::default(),
            emergency_contact: EmergencyContact::default(),
        }
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn is_minor(&self) -> Option<bool> {
        self.is_minor
    }

    pub fn server_verified_age(&self) -> Option<u32> {
        self.server_verified_age
    }

    pub fn how_found_us(&self) -> Option<&HowFoundUs> {
        self.how_found_us.as_ref()
    }

    pub fn parent_consent(&self) -> Option<&ParentConsent> {
        self.parent_consent.as_ref()
    }

    pub fn medical(&self) -> &MedicalHistory {
        &self.medical
    }

    pub fn emergency_contact(&self) -> &EmergencyContact {
        &self.emergency_contact
    }
}

impl Default for EnrollmentAggregate {
    fn default() -> Self {
        Self::new(Uuid::nil())
    }
}

impl Aggregate for EnrollmentAggregate {
    type Update = StepUpdate;

    fn aggregate_type() -> &'static str {
        "Enrollment"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn apply(mut self, update: Self::Update) -> Self {
        match update {
            StepUpdate::BasicInfo { identity, verdict } => {
                self.identity = identity;
                self.is_minor = Some(verdict.is_minor());
                self.server_verified_age = Some(verdict.age());
                if !verdict.is_minor() {
                    self.parent_consent = None;
                }
            }

            StepUpdate::HowFoundUs(how_found_us) => {
                self.how_found_us = Some(how_found_us);
            }

            StepUpdate::ParentConsent(consent) => {
                if self.is_minor == Some(true) {
                    self.parent_consent = Some(consent);
                } else {
                    tracing::warn!(
                        aggregate_id = %self.id,
                        "Ignoring parent consent for an applicant not verified as minor"
                    );
                }
            }

            StepUpdate::MedicalHistory {
                history,
                emergency_contact,
            } => {
                self.medical = history;
                self.emergency_contact = emergency_contact;
            }
        }

        self.version += 1;
        self
    }
}
