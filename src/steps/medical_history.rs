//! Medical history step
//!
//! Independent conditional sub-forms sharing one continue gate: condition
//! checklist, current health problems, medications, smoking, physical
//! activity, EMS screening, emergency contact and liability declaration.

use chrono::{Datelike, Local};

use crate::aggregate::medical::{
    EMS_ABSOLUTE_CONTRAINDICATIONS, EMS_RELATIVE_CONTRAINDICATIONS, MEDICAL_CONDITIONS,
};
use crate::aggregate::{
    CurrentHealthProblems, EmergencyContact, EnrollmentAggregate, MedicalHistory, PhysicalActivity,
    Smoking, StepUpdate,
};
use crate::domain::ValidationError;
use crate::error::AppResult;

fn is_ems_contraindication(name: &str) -> bool {
    EMS_ABSOLUTE_CONTRAINDICATIONS.contains(&name) || EMS_RELATIVE_CONTRAINDICATIONS.contains(&name)
}

#[derive(Debug, Clone, Default)]
pub struct MedicalHistoryStep {
    history: MedicalHistory,
    emergency_contact: EmergencyContact,
}

impl MedicalHistoryStep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resume(aggregate: &EnrollmentAggregate) -> Self {
        Self {
            history: aggregate.medical().clone(),
            emergency_contact: aggregate.emergency_contact().clone(),
        }
    }

    pub fn history(&self) -> &MedicalHistory {
        &self.history
    }

    pub fn emergency_contact(&self) -> &EmergencyContact {
        &self.emergency_contact
    }

    // =========================================================================
    // Condition checklist
    // =========================================================================

    pub fn toggle_condition(&mut self, name: &str, checked: bool) -> Result<(), ValidationError> {
        if !MEDICAL_CONDITIONS.contains(&name) {
            return Err(ValidationError::UnknownCondition(name.to_string()));
        }
        self.history.conditions.toggle(name, checked);
        Ok(())
    }

    pub fn set_condition_year(&mut self, name: &str, year: &str) -> Result<(), ValidationError> {
        self.history.conditions.set_year_of_onset(name, year)
    }

    pub fn set_condition_details(&mut self, name: &str, details: &str) -> Result<(), ValidationError> {
        self.history.conditions.set_details(name, details)
    }

    // =========================================================================
    // EMS screening
    // =========================================================================

    pub fn set_ems_interest(&mut self, interested: bool) {
        self.history.set_ems_interest(interested);
    }

    pub fn toggle_ems_contraindication(
        &mut self,
        name: &str,
        checked: bool,
    ) -> Result<(), ValidationError> {
        if !is_ems_contraindication(name) {
            return Err(ValidationError::UnknownCondition(name.to_string()));
        }
        let checklist = self
            .history
            .ems_contraindications
            .as_mut()
            .ok_or(ValidationError::MissingField("ems_interest"))?;
        checklist.toggle(name, checked);
        Ok(())
    }

    pub fn set_ems_year(&mut self, name: &str, year: &str) -> Result<(), ValidationError> {
        self.history
            .ems_contraindications
            .as_mut()
            .ok_or(ValidationError::MissingField("ems_interest"))?
            .set_year_of_onset(name, year)
    }

    // =========================================================================
    // Medications
    // =========================================================================

    pub fn add_medication(&mut self) {
        self.history.medications.add();
    }

    pub fn remove_medication(&mut self, index: usize) -> Result<(), ValidationError> {
        self.history.medications.remove(index).map(|_| ())
    }

    pub fn set_medication(
        &mut self,
        index: usize,
        medication: &str,
        reason: &str,
    ) -> Result<(), ValidationError> {
        self.history.medications.set(index, medication, reason)
    }

    // =========================================================================
    // Other sub-forms
    // =========================================================================

    pub fn smoking_mut(&mut self) -> &mut Smoking {
        &mut self.history.smoking
    }

    pub fn health_problems_mut(&mut self) -> &mut CurrentHealthProblems {
        &mut self.history.current_health_problems
    }

    pub fn physical_activity_mut(&mut self) -> &mut PhysicalActivity {
        &mut self.history.physical_activity
    }

    pub fn set_family_history(&mut self, text: impl Into<String>) {
        self.history.family_history = text.into();
    }

    pub fn set_allergies(&mut self, text: impl Into<String>) {
        self.history.allergies = text.into();
    }

    pub fn set_surgeries(&mut self, text: impl Into<String>) {
        self.history.surgeries = text.into();
    }

    pub fn set_recent_illness(&mut self, text: impl Into<String>) {
        self.history.recent_illness = text.into();
    }

    pub fn emergency_contact_mut(&mut self) -> &mut EmergencyContact {
        &mut self.emergency_contact
    }

    pub fn set_liability_accepted(&mut self, accepted: bool) {
        self.history.liability_accepted = accepted;
    }

    // =========================================================================
    // Gate
    // =========================================================================

    /// Continue gate evaluated against an explicit current year
    pub fn gate_at(&self, current_year: i32) -> Result<(), ValidationError> {
        self.emergency_contact.validate()?;
        if !self.history.liability_accepted {
            return Err(ValidationError::LiabilityNotAccepted);
        }
        self.history.conditions.check_years(current_year)?;
        if let Some(ems) = &self.history.ems_contraindications {
            ems.check_years(current_year)?;
        }
        Ok(())
    }

    pub fn gate(&self) -> Result<(), ValidationError> {
        self.gate_at(Local::now().year())
    }

    pub fn can_continue(&self) -> bool {
        self.gate().is_ok()
    }

    pub fn complete_at(&self, current_year: i32) -> AppResult<StepUpdate> {
        self.gate_at(current_year)?;
        tracing::debug!(
            conditions = self.history.conditions.len(),
            medications = self.history.medications.filled().count(),
            ems_interest = self.history.ems_interest(),
            "Medical history completed"
        );
        Ok(StepUpdate::MedicalHistory {
            history: self.history.clone(),
            emergency_contact: self.emergency_contact.clone(),
        })
    }

    pub fn complete(&self) -> AppResult<StepUpdate> {
        self.complete_at(Local::now().year())
    }
}
