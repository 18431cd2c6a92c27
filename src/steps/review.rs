//! Review step
//!
//! Read-only summary of the aggregate and the single terminal submission.
//! A failed submission leaves the aggregate untouched so the same
//! submission can be retried.

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::EnrollmentAggregate;
use crate::clients::{RegistrationFailure, RegistrationReceipt, RegistrationService};
use crate::error::{AppError, AppResult};
use crate::wizard::{StepId, Wizard};

fn display_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Display-ready projection of the aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<&'static str>,
    pub verified_age: Option<u32>,
    pub is_minor: bool,
    pub source: Option<&'static str>,
    pub referral: Option<String>,
    pub social_platform: Option<&'static str>,
    pub guardian_name: Option<String>,
    pub active_conditions: usize,
    pub medications: usize,
    pub ems_interest: bool,
    pub ems_contraindications: usize,
    pub currently_smoking: bool,
    pub emergency_contact: String,
    pub liability_accepted: bool,
}

impl ReviewSummary {
    pub fn from_aggregate(aggregate: &EnrollmentAggregate) -> Self {
        let identity = aggregate.identity();
        let how_found_us = aggregate.how_found_us();
        let medical = aggregate.medical();
        let contact = aggregate.emergency_contact();

        let phone = identity.phone.trim();

        Self {
            full_name: identity.full_name(),
            email: identity.email.trim().to_string(),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
            birth_date: identity.birth_date.map(display_date),
            gender: identity.gender.map(|g| g.label()),
            verified_age: aggregate.server_verified_age(),
            is_minor: aggregate.is_minor() == Some(true),
            source: how_found_us.map(|h| h.source().label()),
            referral: how_found_us
                .and_then(|h| h.referral())
                .map(|r| r.code_or_name.clone()),
            social_platform: how_found_us
                .and_then(|h| h.social_platform())
                .map(|p| p.as_str()),
            guardian_name: aggregate
                .parent_consent()
                .map(|c| c.guardian.full_name.clone()),
            active_conditions: medical.conditions.len(),
            medications: medical.medications.filled().count(),
            ems_interest: medical.ems_interest(),
            ems_contraindications: medical
                .ems_contraindications
                .as_ref()
                .map_or(0, |c| c.len()),
            currently_smoking: medical.smoking.currently_smoking(),
            emergency_contact: format!("{} ({})", contact.name.trim(), contact.phone.trim()),
            liability_accepted: medical.liability_accepted,
        }
    }
}

/// Submission state of the review step
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Ready,
    Submitting,
    Failed(RegistrationFailure),
    Submitted(RegistrationReceipt),
}

#[derive(Debug, Clone, Default)]
pub struct ReviewStep {
    state: SubmissionState,
}

impl ReviewStep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn summary(wizard: &Wizard) -> ReviewSummary {
        ReviewSummary::from_aggregate(wizard.aggregate())
    }

    /// Whether the submit control is enabled
    pub fn can_submit(&self) -> bool {
        matches!(self.state, SubmissionState::Ready | SubmissionState::Failed(_))
    }

    /// Enter `Submitting` and return the aggregate to hand over
    pub fn begin_submit<'w>(&mut self, wizard: &'w Wizard) -> AppResult<&'w EnrollmentAggregate> {
        match self.state {
            SubmissionState::Submitting => return Err(AppError::Busy(StepId::Review)),
            SubmissionState::Submitted(_) => return Err(AppError::AlreadySubmitted),
            SubmissionState::Ready | SubmissionState::Failed(_) => {}
        }
        let aggregate = wizard.submission()?;
        self.state = SubmissionState::Submitting;
        Ok(aggregate)
    }

    pub fn complete_submit(
        &mut self,
        result: Result<RegistrationReceipt, RegistrationFailure>,
    ) -> AppResult<RegistrationReceipt> {
        if self.state != SubmissionState::Submitting {
            return Err(AppError::NotAwaiting(StepId::Review));
        }
        match result {
            Ok(receipt) => {
                tracing::info!(user_id = receipt.user_id, status = %receipt.status, "Enrollment submitted");
                self.state = SubmissionState::Submitted(receipt.clone());
                Ok(receipt)
            }
            Err(failure) => {
                tracing::warn!(
                    status = ?failure.status,
                    fields = failure.field_errors.len(),
                    "Enrollment submission failed"
                );
                self.state = SubmissionState::Failed(failure.clone());
                Err(failure.into())
            }
        }
    }

    /// Hand the aggregate to the registration collaborator
    pub async fn submit<R>(&mut self, wizard: &Wizard, registrar: &R) -> AppResult<RegistrationReceipt>
    where
        R: RegistrationService + ?Sized,
    {
        let aggregate = self.begin_submit(wizard)?;
        let result = registrar.register(wizard.context(), aggregate).await;
        self.complete_submit(result)
    }
}
