//! Session Context
//!
//! Identifies one wizard session for logging and for correlating the
//! collaborator calls it issues.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for an enrollment session, created when the wizard mounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Unique id of this wizard session
    pub session_id: Uuid,

    /// Correlation ID for the current outbound request chain
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,
}

impl SessionContext {
    /// Create a context for a fresh session
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            correlation_id: None,
        }
    }

    /// Create context with an explicit session ID
    pub fn with_session_id(mut self, session_id: Uuid) -> Self {
        self.session_id = session_id;
        self
    }

    /// Create context with correlation ID
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Generate a new correlation ID if not present
    pub fn ensure_correlation_id(&mut self) -> Uuid {
        *self.correlation_id.get_or_insert_with(Uuid::new_v4)
    }

    /// Correlation ID to send on a request: the pinned one, or a fresh one
    pub fn request_id(&self) -> Uuid {
        self.correlation_id.unwrap_or_else(Uuid::new_v4)
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
