//! Parent consent record
//!
//! Guardian identity, address and contact, the consent declaration and the
//! guardian's signature. Present in the aggregate only for verified minors.

use serde::{Deserialize, Serialize};

use crate::domain::validators::required;
use crate::domain::ValidationError;
use crate::signature::SignatureImage;

/// Guardian identity, address and contact fields (all required)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardianDetails {
    pub full_name: String,
    pub father_first_name: String,
    pub father_last_name: String,
    pub mother_first_name: String,
    pub mother_last_name: String,
    pub birth_date: String,
    pub id_number: String,
    pub phone: String,
    pub location: String,
    pub street: String,
    pub street_number: String,
    pub postal_code: String,
    pub email: String,
}

impl GuardianDetails {
    pub(crate) fn wire_fields(&self) -> [(&'static str, &str); 13] {
        [
            ("parent_full_name", &self.full_name),
            ("father_first_name", &self.father_first_name),
            ("father_last_name", &self.father_last_name),
            ("mother_first_name", &self.mother_first_name),
            ("mother_last_name", &self.mother_last_name),
            ("parent_birth_date", &self.birth_date),
            ("parent_id_number", &self.id_number),
            ("parent_phone", &self.phone),
            ("parent_location", &self.location),
            ("parent_street", &self.street),
            ("parent_street_number", &self.street_number),
            ("parent_postal_code", &self.postal_code),
            ("parent_email", &self.email),
        ]
    }

    /// Names of the required fields that are still empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.wire_fields()
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }

    /// First missing required field, if any
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.wire_fields()
            .into_iter()
            .try_for_each(|(name, value)| required(name, value))
    }
}

/// Completed parent consent, as merged into the aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentConsent {
    pub guardian: GuardianDetails,
    pub consent_accepted: bool,
    pub signature: SignatureImage,
}
