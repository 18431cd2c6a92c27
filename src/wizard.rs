//! Wizard controller
//!
//! Owns the enrollment aggregate, derives the ordered step list from it and
//! tracks the active step by identifier. Steps report `StepUpdate`s; the
//! controller is the only place the aggregate changes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, EnrollmentAggregate, StepUpdate};
use crate::domain::SessionContext;
use crate::error::{AppError, AppResult};

/// Symbolic name of a wizard step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    BasicInfo,
    HowFoundUs,
    ParentConsent,
    MedicalHistory,
    Review,
}

impl StepId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::BasicInfo => "basic_info",
            StepId::HowFoundUs => "how_found_us",
            StepId::ParentConsent => "parent_consent",
            StepId::MedicalHistory => "medical_history",
            StepId::Review => "review",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered step list for the current aggregate state.
///
/// Four steps for adults (and while the verdict is unknown), five for a
/// verified minor with `ParentConsent` right after `HowFoundUs`.
pub fn compute_steps(aggregate: &EnrollmentAggregate) -> Vec<StepId> {
    let mut steps = vec![StepId::BasicInfo, StepId::HowFoundUs];
    if aggregate.is_minor() == Some(true) {
        steps.push(StepId::ParentConsent);
    }
    steps.push(StepId::MedicalHistory);
    steps.push(StepId::Review);
    steps
}

/// Wizard controller
#[derive(Debug, Clone)]
pub struct Wizard {
    context: SessionContext,
    aggregate: EnrollmentAggregate,
    steps: Vec<StepId>,
    active: StepId,
}

impl Wizard {
    /// Mount a wizard with an empty aggregate on the first step
    pub fn new(context: SessionContext) -> Self {
        let aggregate = EnrollmentAggregate::new(context.session_id);
        let steps = compute_steps(&aggregate);

        tracing::info!(session_id = %context.session_id, "Enrollment wizard started");

        Self {
            context,
            aggregate,
            steps,
            active: StepId::BasicInfo,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn aggregate(&self) -> &EnrollmentAggregate {
        &self.aggregate
    }

    pub fn steps(&self) -> &[StepId] {
        &self.steps
    }

    pub fn active_step(&self) -> StepId {
        self.active
    }

    /// Zero-based position of the active step, for progress display
    pub fn active_index(&self) -> usize {
        self.position(self.active).unwrap_or(0)
    }

    pub fn is_last_step(&self) -> bool {
        self.steps.last() == Some(&self.active)
    }

    /// Move to the entry after the active one; no-op on the last step.
    ///
    /// Free navigation for revisiting steps. Completeness is enforced at
    /// `submission`, not here.
    pub fn advance(&mut self) -> StepId {
        if let Some(next) = self
            .position(self.active)
            .and_then(|index| self.steps.get(index + 1).copied())
        {
            self.move_to(next);
        }
        self.active
    }

    /// Move to the entry before the active one; no-op on the first step
    pub fn retreat(&mut self) -> StepId {
        if let Some(prev) = self
            .position(self.active)
            .filter(|index| *index > 0)
            .map(|index| self.steps[index - 1])
        {
            self.move_to(prev);
        }
        self.active
    }

    /// Merge a completed step's update, recompute the step list, then
    /// advance from the completed step's identifier.
    ///
    /// The update must come from the active step. On error nothing changes.
    pub fn merge_and_advance(&mut self, update: StepUpdate) -> AppResult<StepId> {
        let completed = update.step();
        if completed != self.active {
            return Err(AppError::StepMismatch {
                active: self.active,
                update: completed,
            });
        }

        let update_type = update.update_type();
        let aggregate = std::mem::take(&mut self.aggregate);
        self.aggregate = aggregate.apply(update);
        self.steps = compute_steps(&self.aggregate);

        tracing::debug!(
            session_id = %self.context.session_id,
            aggregate = EnrollmentAggregate::aggregate_type(),
            update = update_type,
            version = self.aggregate.version(),
            step_count = self.steps.len(),
            "Merged step update"
        );

        Ok(self.advance())
    }

    /// The full aggregate, available only once the review step is active
    /// and every step before it has merged its update
    pub fn submission(&self) -> AppResult<&EnrollmentAggregate> {
        if self.active != StepId::Review {
            return Err(AppError::NotAtReview(self.active));
        }
        if let Some(step) = self.first_incomplete() {
            tracing::warn!(
                session_id = %self.context.session_id,
                step = %step,
                "Submission requested with an incomplete step"
            );
            return Err(AppError::IncompleteStep(step));
        }
        Ok(&self.aggregate)
    }

    /// First step in the current list whose data is missing from the
    /// aggregate
    pub fn first_incomplete(&self) -> Option<StepId> {
        self.steps
            .iter()
            .copied()
            .find(|step| !self.is_complete(*step))
    }

    fn is_complete(&self, step: StepId) -> bool {
        let aggregate = &self.aggregate;
        match step {
            StepId::BasicInfo => aggregate.is_minor().is_some(),
            StepId::HowFoundUs => aggregate.how_found_us().is_some(),
            StepId::ParentConsent => aggregate.parent_consent().is_some(),
            StepId::MedicalHistory => {
                aggregate.emergency_contact().validate().is_ok()
                    && aggregate.medical().liability_accepted
            }
            StepId::Review => true,
        }
    }

    fn position(&self, step: StepId) -> Option<usize> {
        self.steps.iter().position(|s| *s == step)
    }

    fn move_to(&mut self, step: StepId) {
        tracing::debug!(
            session_id = %self.context.session_id,
            from = %self.active,
            to = %step,
            "Step changed"
        );
        self.active = step;
    }
}
