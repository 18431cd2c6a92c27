//! member_enrollment Library
//!
//! New-member enrollment wizard: a variable-length step sequence driven by a
//! server-verified age verdict, per-step validation gates, a debounced
//! referral lookup and a single aggregated registration submission.
//!
//! The host UI owns a [`Wizard`], renders the component for its active
//! step, and feeds each component's [`StepUpdate`] back through
//! [`Wizard::merge_and_advance`].

pub mod aggregate;
pub mod clients;
pub mod config;
pub mod domain;
pub mod signature;
pub mod steps;
pub mod telemetry;
pub mod wizard;

mod error;

pub use aggregate::{Aggregate, EnrollmentAggregate, StepUpdate};
pub use clients::{
    AgeVerifier, BackendClient, ClientError, ReferralLookup, RegistrationFailure,
    RegistrationReceipt, RegistrationService,
};
pub use config::Config;
pub use domain::{BirthDateEntry, SessionContext, ValidationError};
pub use error::{AppError, AppResult};
pub use signature::{SignatureImage, SignaturePad};
pub use wizard::{compute_steps, StepId, Wizard};
