//! Step updates
//!
//! Partial-aggregate updates reported by completed steps. The wizard merges
//! them; steps never touch the aggregate directly.

use super::consent::ParentConsent;
use super::enrollment::{AgeVerdict, Identity};
use super::how_found::HowFoundUs;
use super::medical::{EmergencyContact, MedicalHistory};
use crate::wizard::StepId;

/// Data reported by a step that passed its gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepUpdate {
    /// Identity plus the server's age verdict
    BasicInfo {
        identity: Identity,
        verdict: AgeVerdict,
    },

    HowFoundUs(HowFoundUs),

    ParentConsent(ParentConsent),

    MedicalHistory {
        history: MedicalHistory,
        emergency_contact: EmergencyContact,
    },
}

impl StepUpdate {
    /// Step that produced this update
    pub fn step(&self) -> StepId {
        match self {
            StepUpdate::BasicInfo { .. } => StepId::BasicInfo,
            StepUpdate::HowFoundUs(_) => StepId::HowFoundUs,
            StepUpdate::ParentConsent(_) => StepId::ParentConsent,
            StepUpdate::MedicalHistory { .. } => StepId::MedicalHistory,
        }
    }

    /// Get the update type as a string
    pub fn update_type(&self) -> &'static str {
        match self {
            StepUpdate::BasicInfo { .. } => "BasicInfoCompleted",
            StepUpdate::HowFoundUs(_) => "HowFoundUsCompleted",
            StepUpdate::ParentConsent(_) => "ParentConsentCompleted",
            StepUpdate::MedicalHistory { .. } => "MedicalHistoryCompleted",
        }
    }
}
