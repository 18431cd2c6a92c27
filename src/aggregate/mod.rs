//! Aggregate module
//!
//! The enrollment aggregate, its nested records and the partial updates the
//! wizard merges into it.

pub mod consent;
pub mod enrollment;
pub mod how_found;
pub mod medical;
pub mod update;

pub use consent::{GuardianDetails, ParentConsent};
pub use enrollment::{AgeVerdict, EnrollmentAggregate, Gender, Identity};
pub use how_found::{FoundUsSource, HowFoundUs, ReferralDetails, SocialPlatform};
pub use medical::{
    ConditionChecklist, ConditionEntry, CurrentHealthProblems, EmergencyContact, Medication,
    MedicalHistory, MedicationList, PastSmoking, PhysicalActivity, Smoking,
};
pub use update::StepUpdate;

/// Aggregate trait: a record that changes only by folding updates into it
pub trait Aggregate: Sized {
    /// The type of updates this aggregate accepts
    type Update;

    /// Get the aggregate type name (for logging)
    fn aggregate_type() -> &'static str;

    /// Get the aggregate ID
    fn id(&self) -> uuid::Uuid;

    /// Get the current version (number of updates applied)
    fn version(&self) -> u64;

    /// Apply an update to produce the next state
    fn apply(self, update: Self::Update) -> Self;
}
