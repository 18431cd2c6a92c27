//! Medical history record
//!
//! Condition checklists keyed by condition name, the prescribed medication
//! list with its minimum slot count, the smoking branch and free-text history.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::validators;
use crate::domain::ValidationError;

/// Minimum number of medication slots shown to the applicant
pub const MIN_MEDICATION_SLOTS: usize = 3;

/// Conditions offered in the medical checklist
pub const MEDICAL_CONDITIONS: &[&str] = &[
    "Heart disease or cardiac event",
    "Hypertension (high blood pressure)",
    "Low blood pressure",
    "Diabetes type 1 or 2",
    "Hypercholesterolemia",
    "Asthma or respiratory problems",
    "Epilepsy",
    "Arthritis or joint problems",
    "Osteoporosis",
    "Spinal problems",
    "Disc herniation (cervical, lumbar)",
    "Thyroid problems",
    "Kidney problems",
    "Liver problems",
    "Anaemia",
    "Migraines",
    "Allergies (medication, food)",
    "Psychological problems (anxiety, depression)",
    "Eating disorders",
    "Past surgeries",
    "Injuries or fractures",
    "Balance problems",
    "Varicose veins",
    "Temporomandibular joint disorder",
    "Other condition",
];

/// EMS contraindications that rule out training
pub const EMS_ABSOLUTE_CONTRAINDICATIONS: &[&str] = &[
    "Pacemaker",
    "Pregnancy",
    "Fever, acute bacterial or viral infection",
    "Thrombosis / thrombophlebitis",
    "Stent or bypass (within the last 6 months)",
    "Advanced arteriosclerosis",
    "High blood pressure (not medically controlled)",
    "Bleeding disorders",
    "Neoplastic disease (tumours, cancer)",
    "Acute arthritis",
    "Neurological disease",
    "Progressive muscular dystrophy",
    "Abdominal wall or inguinal hernia",
    "Lymphoedema",
];

/// EMS contraindications that require medical advice
pub const EMS_RELATIVE_CONTRAINDICATIONS: &[&str] = &[
    "Cardiac conditions",
    "Cardiac arrhythmia",
    "Diabetes mellitus type I",
    "Epilepsy (case by case)",
    "Recent surgery (6-8 months)",
    "Ascites, pulmonary or pleural fluid",
    "Skin conditions",
    "Acute undiagnosed lower back pain",
    "Acute neuralgia / acute disc herniation",
    "Varicose veins (avoid area)",
    "Internal organ conditions (e.g. kidneys)",
    "Ongoing medication",
    "Recent inflammation or injury",
    "Sunburn",
];

/// Optional details of a checked condition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionEntry {
    pub year_of_onset: String,
    pub details: String,
}

/// Checked conditions, keyed by name.
///
/// Key presence is the only record of "has this condition": unchecking
/// removes the entry together with its details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionChecklist(BTreeMap<String, ConditionEntry>);

impl ConditionChecklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check or uncheck a condition. Checking an unchecked condition starts
    /// from an empty entry; checking a checked one keeps its details.
    pub fn toggle(&mut self, name: &str, checked: bool) {
        if checked {
            self.0.entry(name.to_string()).or_default();
        } else {
            self.0.remove(name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ConditionEntry> {
        self.0.get(name)
    }

    pub fn set_year_of_onset(
        &mut self,
        name: &str,
        year: impl Into<String>,
    ) -> Result<(), ValidationError> {
        self.entry_mut(name)?.year_of_onset = year.into();
        Ok(())
    }

    pub fn set_details(&mut self, name: &str, details: impl Into<String>) -> Result<(), ValidationError> {
        self.entry_mut(name)?.details = details.into();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConditionEntry)> {
        self.0.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Every supplied year of onset must be a four-digit year in
    /// `1900..=current_year`; blank years are not checked.
    pub fn check_years(&self, current_year: i32) -> Result<(), ValidationError> {
        self.0
            .values()
            .map(|entry| entry.year_of_onset.trim())
            .filter(|year| !year.is_empty())
            .try_for_each(|year| validators::year_of_onset(year, current_year).map(|_| ()))
    }

    fn entry_mut(&mut self, name: &str) -> Result<&mut ConditionEntry, ValidationError> {
        self.0
            .get_mut(name)
            .ok_or_else(|| ValidationError::ConditionNotSelected(name.to_string()))
    }
}

/// One prescribed medication slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub medication: String,
    pub reason: String,
}

impl Medication {
    pub fn is_blank(&self) -> bool {
        self.medication.trim().is_empty() && self.reason.trim().is_empty()
    }
}

/// Ordered, user-extendable medication list.
///
/// # Invariants
/// - Always holds at least `MIN_MEDICATION_SLOTS` entries
/// - No upper bound on additions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Medication>", into = "Vec<Medication>")]
pub struct MedicationList(Vec<Medication>);

impl MedicationList {
    pub fn new() -> Self {
        Self(vec![Medication::default(); MIN_MEDICATION_SLOTS])
    }

    /// Append an empty slot
    pub fn add(&mut self) {
        self.0.push(Medication::default());
    }

    /// Remove the slot at `index`; refused at or below the floor
    pub fn remove(&mut self, index: usize) -> Result<Medication, ValidationError> {
        if self.0.len() <= MIN_MEDICATION_SLOTS {
            return Err(ValidationError::MedicationFloor {
                minimum: MIN_MEDICATION_SLOTS,
            });
        }
        if index >= self.0.len() {
            return Err(ValidationError::NoSuchEntry {
                field: "prescribed_medications",
                index,
            });
        }
        Ok(self.0.remove(index))
    }

    pub fn set(
        &mut self,
        index: usize,
        medication: impl Into<String>,
        reason: impl Into<String>,
    ) -> Result<(), ValidationError> {
        let slot = self.0.get_mut(index).ok_or(ValidationError::NoSuchEntry {
            field: "prescribed_medications",
            index,
        })?;
        slot.medication = medication.into();
        slot.reason = reason.into();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Medication] {
        &self.0
    }

    /// Slots the applicant actually filled in
    pub fn filled(&self) -> impl Iterator<Item = &Medication> {
        self.0.iter().filter(|m| !m.is_blank())
    }
}

impl Default for MedicationList {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Medication>> for MedicationList {
    fn from(mut entries: Vec<Medication>) -> Self {
        if entries.len() < MIN_MEDICATION_SLOTS {
            entries.resize(MIN_MEDICATION_SLOTS, Medication::default());
        }
        Self(entries)
    }
}

impl From<MedicationList> for Vec<Medication> {
    fn from(list: MedicationList) -> Self {
        list.0
    }
}

/// Past smoking answer for someone not currently smoking
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "ever_smoked", rename_all = "snake_case")]
pub enum PastSmoking {
    #[default]
    Unanswered,
    Never,
    Former {
        smoking_years: String,
        quit_years_ago: String,
    },
}

/// Smoking branch. The two top-level answers carry disjoint fields, so
/// switching between them discards the other branch's values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Smoking {
    Current { daily_cigarettes: String },
    NotCurrent { past: PastSmoking },
}

impl Smoking {
    pub fn currently_smoking(&self) -> bool {
        matches!(self, Self::Current { .. })
    }

    /// Answer the top-level question; answering differently resets the
    /// other branch, repeating the same answer keeps what was entered.
    pub fn set_currently_smoking(&mut self, smoking: bool) {
        if smoking == self.currently_smoking() {
            return;
        }
        *self = if smoking {
            Self::Current {
                daily_cigarettes: String::new(),
            }
        } else {
            Self::NotCurrent {
                past: PastSmoking::Unanswered,
            }
        };
    }

    /// Only meaningful while currently smoking; ignored otherwise
    pub fn set_daily_cigarettes(&mut self, count: impl Into<String>) {
        if let Self::Current { daily_cigarettes } = self {
            *daily_cigarettes = count.into();
        }
    }

    /// Only meaningful while not currently smoking; ignored otherwise
    pub fn set_ever_smoked(&mut self, ever: bool) {
        let Self::NotCurrent { past } = self else {
            return;
        };
        if !ever {
            *past = PastSmoking::Never;
        } else if !matches!(past, PastSmoking::Former { .. }) {
            *past = PastSmoking::Former {
                smoking_years: String::new(),
                quit_years_ago: String::new(),
            };
        }
    }

    /// Only meaningful for former smokers; ignored otherwise
    pub fn set_former_details(&mut self, years: impl Into<String>, quit_ago: impl Into<String>) {
        if let Self::NotCurrent {
            past:
                PastSmoking::Former {
                    smoking_years,
                    quit_years_ago,
                },
        } = self
        {
            *smoking_years = years.into();
            *quit_years_ago = quit_ago.into();
        }
    }

    pub fn daily_cigarettes(&self) -> Option<&str> {
        match self {
            Self::Current { daily_cigarettes } => Some(daily_cigarettes),
            Self::NotCurrent { .. } => None,
        }
    }

    pub fn ever_smoked(&self) -> Option<bool> {
        match self {
            Self::NotCurrent {
                past: PastSmoking::Never,
            } => Some(false),
            Self::NotCurrent {
                past: PastSmoking::Former { .. },
            } => Some(true),
            _ => None,
        }
    }

    pub fn smoking_years(&self) -> Option<&str> {
        match self {
            Self::NotCurrent {
                past: PastSmoking::Former { smoking_years, .. },
            } => Some(smoking_years),
            _ => None,
        }
    }

    pub fn quit_years_ago(&self) -> Option<&str> {
        match self {
            Self::NotCurrent {
                past: PastSmoking::Former { quit_years_ago, .. },
            } => Some(quit_years_ago),
            _ => None,
        }
    }
}

impl Default for Smoking {
    fn default() -> Self {
        Self::NotCurrent {
            past: PastSmoking::Unanswered,
        }
    }
}

/// Current health problems; details are kept only while answered yes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentHealthProblems {
    has_problems: bool,
    details: String,
}

impl CurrentHealthProblems {
    pub fn has_problems(&self) -> bool {
        self.has_problems
    }

    pub fn details(&self) -> Option<&str> {
        self.has_problems.then_some(self.details.as_str())
    }

    pub fn set_has_problems(&mut self, has_problems: bool) {
        self.has_problems = has_problems;
        if !has_problems {
            self.details.clear();
        }
    }

    pub fn set_details(&mut self, details: impl Into<String>) {
        if self.has_problems {
            self.details = details.into();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalActivity {
    pub description: String,
    pub frequency: String,
    pub duration: String,
}

/// Medical history as collected by the medical step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalHistory {
    pub conditions: ConditionChecklist,
    pub current_health_problems: CurrentHealthProblems,
    pub medications: MedicationList,
    pub smoking: Smoking,
    pub physical_activity: PhysicalActivity,
    pub family_history: String,
    pub allergies: String,
    pub surgeries: String,
    pub recent_illness: String,

    /// EMS contraindications; `Some` iff the applicant is interested in EMS
    pub ems_contraindications: Option<ConditionChecklist>,

    /// Liability declaration, required for everyone
    pub liability_accepted: bool,
}

impl MedicalHistory {
    pub fn ems_interest(&self) -> bool {
        self.ems_contraindications.is_some()
    }

    /// Turning interest off drops the contraindication checklist
    pub fn set_ems_interest(&mut self, interested: bool) {
        match (interested, self.ems_contraindications.is_some()) {
            (true, false) => self.ems_contraindications = Some(ConditionChecklist::new()),
            (false, true) => self.ems_contraindications = None,
            _ => {}
        }
    }
}

/// Person to contact in an emergency, required for every applicant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
}

impl EmergencyContact {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validators::required("emergency_contact_name", &self.name)?;
        validators::required("emergency_contact_phone", &self.phone)
    }
}
