//! Basic info step
//!
//! Collects identity fields and gates on a single server-side age check.
//! The step is sans-IO at its core: `begin_continue` validates and hands out
//! the age check request, `complete_continue` folds in the response.
//! `continue_with` drives both halves against an `AgeVerifier`.

use chrono::NaiveDate;

use crate::aggregate::{AgeVerdict, EnrollmentAggregate, Identity, StepUpdate};
use crate::clients::{AgeCheckRequest, AgeVerifier, ClientError};
use crate::domain::{BirthDateEntry, SessionContext, ValidationError};
use crate::error::{AppError, AppResult};
use crate::wizard::StepId;

/// Interaction state of the continue action
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BasicInfoState {
    #[default]
    Idle,
    /// Age check in flight; continue is disabled
    AwaitingServer,
    /// Last age check failed; message shown inline
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct BasicInfoStep {
    identity: Identity,
    birth_date: BirthDateEntry,
    errors: Vec<ValidationError>,
    state: BasicInfoState,
    pending: Option<Identity>,
}

impl BasicInfoStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-seed from a previously merged identity
    pub fn resume(aggregate: &EnrollmentAggregate) -> Self {
        let identity = aggregate.identity().clone();
        let birth_date = identity
            .birth_date
            .map(BirthDateEntry::from_date)
            .unwrap_or_default();
        Self {
            identity,
            birth_date,
            ..Self::default()
        }
    }

    /// Text and choice fields; the birth date lives in `birth_date_mut`
    pub fn identity_mut(&mut self) -> &mut Identity {
        &mut self.identity
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn birth_date_mut(&mut self) -> &mut BirthDateEntry {
        &mut self.birth_date
    }

    pub fn birth_date(&self) -> &BirthDateEntry {
        &self.birth_date
    }

    pub fn state(&self) -> &BasicInfoState {
        &self.state
    }

    /// Field errors from the last continue attempt
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Whether the continue control is enabled
    pub fn can_continue(&self) -> bool {
        self.state != BasicInfoState::AwaitingServer
    }

    /// Validate fields and, if they pass, enter `AwaitingServer` and return
    /// the one age check to issue.
    pub fn begin_continue(&mut self) -> AppResult<AgeCheckRequest> {
        if !self.can_continue() {
            return Err(AppError::Busy(StepId::BasicInfo));
        }

        let mut identity = self.identity.clone();
        identity.birth_date = self.birth_date.canonical();

        self.errors = identity.errors();
        if let Some(first) = self.errors.first() {
            self.state = BasicInfoState::Idle;
            return Err(first.clone().into());
        }

        let birth_date = identity
            .birth_date
            .ok_or(ValidationError::MissingField("birth_date"))?;

        self.pending = Some(identity);
        self.state = BasicInfoState::AwaitingServer;
        Ok(AgeCheckRequest { birth_date })
    }

    /// Fold in the age check outcome. Success yields the update to merge;
    /// failure leaves the step on screen with an inline error.
    pub fn complete_continue(
        &mut self,
        result: Result<AgeVerdict, ClientError>,
    ) -> AppResult<StepUpdate> {
        if self.state != BasicInfoState::AwaitingServer {
            return Err(AppError::NotAwaiting(StepId::BasicInfo));
        }
        let identity = self
            .pending
            .take()
            .ok_or(AppError::NotAwaiting(StepId::BasicInfo))?;

        match result {
            Ok(verdict) => {
                self.state = BasicInfoState::Idle;
                Ok(StepUpdate::BasicInfo { identity, verdict })
            }
            Err(err) => {
                tracing::warn!(error = %err, "Age verification failed");
                self.state = BasicInfoState::Failed(err.user_message());
                Err(err.into())
            }
        }
    }

    /// Run a full continue attempt against the verifier
    pub async fn continue_with<V>(
        &mut self,
        verifier: &V,
        ctx: &SessionContext,
    ) -> AppResult<StepUpdate>
    where
        V: AgeVerifier + ?Sized,
    {
        let request = self.begin_continue()?;
        tracing::debug!(session_id = %ctx.session_id, "Requesting age verification");
        let result = verifier.check_age(ctx, request.birth_date).await;
        self.complete_continue(result)
    }

    /// Client-side age for instant feedback next to the date field
    pub fn age_hint(&self, today: NaiveDate) -> Option<u32> {
        self.birth_date.age_hint(today)
    }
}
