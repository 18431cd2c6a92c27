//! Registration payload
//!
//! Wire shape of `POST /auth/register`, borrowed from the aggregate.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::aggregate::{
    ConditionChecklist, EmergencyContact, EnrollmentAggregate, FoundUsSource, Gender, Medication,
    MedicalHistory, ParentConsent, PhysicalActivity, SocialPlatform,
};

/// Consent document metadata sent alongside the guardian's signature
pub const CONSENT_DOCUMENT_TYPE: &str = "parent_consent";
pub const CONSENT_DOCUMENT_VERSION: &str = "1.0";

/// Body of a registration request.
///
/// Deliberately not `Debug`: it carries the password.
#[derive(Serialize)]
pub struct RegistrationPayload<'a> {
    pub name: String,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'a str>,
    pub password: &'a str,
    pub password_confirmation: &'a str,
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    pub is_minor: bool,
    pub server_verified_age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub how_found_us: Option<FoundUsSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral_code_or_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_platform: Option<SocialPlatform>,
    pub medical_history: MedicalHistoryPayload<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_consent: Option<ParentConsentPayload<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ConditionPayload<'a> {
    pub has_condition: bool,
    pub year_of_onset: Option<&'a str>,
    pub details: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct HealthProblemsPayload<'a> {
    pub has_problems: bool,
    pub details: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SmokingPayload<'a> {
    pub currently_smoking: bool,
    pub daily_cigarettes: Option<&'a str>,
    pub ever_smoked: bool,
    pub smoking_years: Option<&'a str>,
    pub quit_years_ago: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct MedicalHistoryPayload<'a> {
    pub medical_conditions: BTreeMap<&'a str, ConditionPayload<'a>>,
    pub current_health_problems: HealthProblemsPayload<'a>,
    pub prescribed_medications: Vec<&'a Medication>,
    pub smoking: SmokingPayload<'a>,
    pub physical_activity: &'a PhysicalActivity,
    pub family_history: &'a str,
    pub allergies: &'a str,
    pub surgeries: &'a str,
    pub recent_illness: &'a str,
    pub emergency_contact: &'a EmergencyContact,
    pub ems_interest: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ems_contraindications: Option<BTreeMap<&'a str, ConditionPayload<'a>>>,
    pub ems_liability_accepted: bool,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ParentConsentPayload<'a> {
    #[serde(flatten)]
    pub guardian: BTreeMap<&'static str, &'a str>,
    pub consent_accepted: bool,
    pub signature_data: &'a str,
    pub document_type: &'static str,
    pub document_version: &'static str,
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn conditions(checklist: &ConditionChecklist) -> BTreeMap<&str, ConditionPayload<'_>> {
    checklist
        .iter()
        .map(|(name, entry)| {
            (
                name,
                ConditionPayload {
                    has_condition: true,
                    year_of_onset: non_empty(&entry.year_of_onset),
                    details: non_empty(&entry.details),
                },
            )
        })
        .collect()
}

impl<'a> MedicalHistoryPayload<'a> {
    pub fn new(
        history: &'a MedicalHistory,
        emergency_contact: &'a EmergencyContact,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        let smoking = &history.smoking;
        Self {
            medical_conditions: conditions(&history.conditions),
            current_health_problems: HealthProblemsPayload {
                has_problems: history.current_health_problems.has_problems(),
                details: history.current_health_problems.details().unwrap_or_default(),
            },
            prescribed_medications: history.medications.filled().collect(),
            smoking: SmokingPayload {
                currently_smoking: smoking.currently_smoking(),
                daily_cigarettes: smoking.daily_cigarettes().and_then(non_empty),
                ever_smoked: smoking.ever_smoked().unwrap_or(false),
                smoking_years: smoking.smoking_years().and_then(non_empty),
                quit_years_ago: smoking.quit_years_ago().and_then(non_empty),
            },
            physical_activity: &history.physical_activity,
            family_history: &history.family_history,
            allergies: &history.allergies,
            surgeries: &history.surgeries,
            recent_illness: &history.recent_illness,
            emergency_contact,
            ems_interest: history.ems_interest(),
            ems_contraindications: history.ems_contraindications.as_ref().map(conditions),
            ems_liability_accepted: history.liability_accepted,
            submitted_at,
        }
    }
}

impl<'a> From<&'a ParentConsent> for ParentConsentPayload<'a> {
    fn from(consent: &'a ParentConsent) -> Self {
        Self {
            guardian: consent.guardian.wire_fields().into_iter().collect(),
            consent_accepted: consent.consent_accepted,
            signature_data: consent.signature.as_data_url(),
            document_type: CONSENT_DOCUMENT_TYPE,
            document_version: CONSENT_DOCUMENT_VERSION,
        }
    }
}

impl<'a> RegistrationPayload<'a> {
    /// Build the request body from a completed aggregate
    pub fn new(aggregate: &'a EnrollmentAggregate, submitted_at: DateTime<Utc>) -> Self {
        let identity = aggregate.identity();
        let how_found_us = aggregate.how_found_us();
        let referral = how_found_us.and_then(|h| h.referral());

        Self {
            name: identity.full_name(),
            first_name: identity.first_name.trim(),
            last_name: identity.last_name.trim(),
            email: identity.email.trim(),
            phone: non_empty(&identity.phone),
            password: &identity.password,
            password_confirmation: &identity.password_confirmation,
            birth_date: identity.birth_date,
            gender: identity.gender,
            is_minor: aggregate.is_minor().unwrap_or(false),
            server_verified_age: aggregate.server_verified_age(),
            how_found_us: how_found_us.map(|h| h.source()),
            referral_code_or_name: referral.map(|r| r.code_or_name.as_str()),
            referrer_id: referral.and_then(|r| r.referrer_id),
            social_platform: how_found_us.and_then(|h| h.social_platform()),
            medical_history: MedicalHistoryPayload::new(
                aggregate.medical(),
                aggregate.emergency_contact(),
                submitted_at,
            ),
            parent_consent: aggregate.parent_consent().map(ParentConsentPayload::from),
        }
    }
}
