//! Domain module
//!
//! Pure domain primitives: field validators, validation errors, birth date
//! entry and the session context.

pub mod birth_date;
pub mod context;
pub mod error;
pub mod validators;

pub use birth_date::BirthDateEntry;
pub use context::SessionContext;
pub use error::ValidationError;
