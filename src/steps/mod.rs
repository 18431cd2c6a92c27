//! Step components
//!
//! One component per wizard step. Each owns its local interaction state and
//! reports a `StepUpdate` once its gate passes; none holds the aggregate.

pub mod basic_info;
pub mod how_found_us;
pub mod medical_history;
pub mod parent_consent;
pub mod referral;
pub mod review;

pub use basic_info::{BasicInfoState, BasicInfoStep};
pub use how_found_us::HowFoundUsStep;
pub use medical_history::MedicalHistoryStep;
pub use parent_consent::ParentConsentStep;
pub use referral::{ReferralField, ReferralStatus, ReferralValidator};
pub use review::{ReviewStep, ReviewSummary, SubmissionState};
