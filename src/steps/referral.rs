//! Debounced referral validation
//!
//! Every keystroke replaces the field value and bumps a generation counter.
//! A spawned task waits out the quiet period and exits if a newer keystroke
//! arrived meanwhile; otherwise it issues the lookup. A response is accepted
//! only if the field still holds the value that was looked up, so replies
//! for superseded input are dropped on arrival.
//!
//! Field state is published on a `tokio::sync::watch` channel so a UI can
//! redraw on change.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::aggregate::ReferralDetails;
use crate::clients::{ClientError, ReferralCheck, ReferralLookup};
use crate::config::Config;
use crate::domain::SessionContext;

/// Message shown for a referral restored from an earlier visit
pub const PREVIOUSLY_VALIDATED: &str = "Referrer confirmed on a previous visit";

/// Indicator shown next to the referral field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReferralStatus {
    #[default]
    Idle,
    Pending,
    Valid {
        message: String,
        referrer_id: Option<i64>,
    },
    Invalid {
        message: String,
    },
    /// Lookup could not be completed; typing again retries
    Failed {
        message: String,
    },
}

impl ReferralStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Valid { message, .. } | Self::Invalid { message } | Self::Failed { message } => {
                Some(message)
            }
            Self::Idle | Self::Pending => None,
        }
    }

    fn from_result(result: Result<ReferralCheck, ClientError>) -> Self {
        match result {
            Ok(check) if check.is_valid => Self::Valid {
                message: check.message,
                referrer_id: check.referrer_id,
            },
            Ok(check) => Self::Invalid {
                message: check.message,
            },
            Err(err) => Self::Failed {
                message: err.user_message(),
            },
        }
    }
}

/// Snapshot of the referral field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReferralField {
    pub input: String,
    /// Bumped on every edit
    pub generation: u64,
    pub status: ReferralStatus,
}

/// Referral field with debounced lookups.
///
/// `input` spawns onto the current tokio runtime.
#[derive(Clone)]
pub struct ReferralValidator {
    lookup: Arc<dyn ReferralLookup>,
    context: SessionContext,
    quiet_period: Duration,
    state: Arc<watch::Sender<ReferralField>>,
}

impl ReferralValidator {
    pub fn new(
        lookup: Arc<dyn ReferralLookup>,
        context: SessionContext,
        quiet_period: Duration,
    ) -> Self {
        let (state, _) = watch::channel(ReferralField::default());
        Self {
            lookup,
            context,
            quiet_period,
            state: Arc::new(state),
        }
    }

    pub fn from_config(
        lookup: Arc<dyn ReferralLookup>,
        context: SessionContext,
        config: &Config,
    ) -> Self {
        Self::new(lookup, context, config.referral_debounce)
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Receiver notified on every field change
    pub fn subscribe(&self) -> watch::Receiver<ReferralField> {
        self.state.subscribe()
    }

    pub fn current(&self) -> ReferralField {
        self.state.borrow().clone()
    }

    /// Record a keystroke and schedule a lookup after the quiet period
    pub fn input(&self, value: impl Into<String>) {
        let value = value.into();
        let generation = self.replace(value.clone(), ReferralStatus::Idle);

        if value.trim().is_empty() {
            return;
        }

        let state = Arc::clone(&self.state);
        let lookup = Arc::clone(&self.lookup);
        let ctx = self.context.clone();
        let quiet_period = self.quiet_period;

        tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;

            // check and mark in one step so a keystroke cannot slip between
            let issued = state.send_if_modified(|field| {
                if field.generation != generation {
                    return false;
                }
                field.status = ReferralStatus::Pending;
                true
            });
            if !issued {
                return;
            }
            tracing::debug!(session_id = %ctx.session_id, generation, "Referral lookup issued");

            let result = lookup.check_referral(&ctx, &value).await;

            let accepted = state.send_if_modified(|field| {
                if field.input != value {
                    return false;
                }
                field.status = ReferralStatus::from_result(result);
                true
            });

            if accepted {
                tracing::debug!(session_id = %ctx.session_id, generation, "Referral lookup applied");
            } else {
                tracing::debug!(
                    session_id = %ctx.session_id,
                    generation,
                    "Discarding stale referral response"
                );
            }
        });
    }

    /// Clear the field; any outstanding lookup becomes stale
    pub fn reset(&self) {
        self.replace(String::new(), ReferralStatus::Idle);
    }

    /// Seed the field with a previously validated referral without looking
    /// it up again
    pub fn restore(&self, details: &ReferralDetails) {
        let status = if details.validated {
            ReferralStatus::Valid {
                message: PREVIOUSLY_VALIDATED.to_string(),
                referrer_id: details.referrer_id,
            }
        } else {
            ReferralStatus::Idle
        };
        self.replace(details.code_or_name.clone(), status);
    }

    /// The confirmed referral, if the current value passed the lookup
    pub fn validated(&self) -> Option<ReferralDetails> {
        let field = self.state.borrow();
        match &field.status {
            ReferralStatus::Valid { referrer_id, .. } => Some(ReferralDetails {
                code_or_name: field.input.trim().to_string(),
                validated: true,
                referrer_id: *referrer_id,
            }),
            _ => None,
        }
    }

    fn replace(&self, input: String, status: ReferralStatus) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|field| {
            field.generation += 1;
            field.input = input;
            field.status = status;
            generation = field.generation;
        });
        generation
    }
}

impl std::fmt::Debug for ReferralValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferralValidator")
            .field("quiet_period", &self.quiet_period)
            .field("field", &*self.state.borrow())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Lookup fake: answers valid for identifiers starting with "69",
    /// "FAIL" errors, everything else is invalid. Per-identifier delays
    /// simulate out-of-order responses.
    #[derive(Default)]
    pub(crate) struct FakeLookup {
        pub calls: Mutex<Vec<String>>,
        pub delays: HashMap<String, Duration>,
    }

    #[async_trait]
    impl ReferralLookup for FakeLookup {
        async fn check_referral(
            &self,
            _ctx: &SessionContext,
            identifier: &str,
        ) -> Result<ReferralCheck, ClientError> {
            self.calls.lock().unwrap().push(identifier.to_string());
            if let Some(delay) = self.delays.get(identifier) {
                tokio::time::sleep(*delay).await;
            }
            if identifier == "FAIL" {
                return Err(ClientError::Status {
                    status: 500,
                    message: None,
                });
            }
            if identifier.starts_with("69") || identifier.starts_with("AB") {
                Ok(ReferralCheck::valid(
                    format!("Found: {}", identifier),
                    Some(identifier.len() as i64),
                ))
            } else {
                Ok(ReferralCheck::invalid("No member found"))
            }
        }
    }

    fn validator(lookup: Arc<FakeLookup>) -> ReferralValidator {
        ReferralValidator::new(lookup, SessionContext::new(), Duration::from_millis(500))
    }

    async fn settled(rx: &mut watch::Receiver<ReferralField>) -> ReferralField {
        let field = rx
            .wait_for(|f| !matches!(f.status, ReferralStatus::Idle | ReferralStatus::Pending))
            .await
            .unwrap();
        (*field).clone()
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_input_issues_one_call() {
        let lookup = Arc::new(FakeLookup::default());
        let validator = validator(Arc::clone(&lookup));
        let mut rx = validator.subscribe();

        validator.input("A");
        tokio::time::sleep(Duration::from_millis(100)).await;
        validator.input("AB");
        tokio::time::sleep(Duration::from_millis(100)).await;
        validator.input("ABC");

        let field = settled(&mut rx).await;
        assert_eq!(field.input, "ABC");
        assert!(field.status.is_valid());
        assert_eq!(*lookup.calls.lock().unwrap(), vec!["ABC".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_discarded() {
        let mut delays = HashMap::new();
        delays.insert("AB".to_string(), Duration::from_millis(2_000));
        let lookup = Arc::new(FakeLookup {
            delays,
            ..FakeLookup::default()
        });
        let validator = validator(Arc::clone(&lookup));

        validator.input("AB");
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(validator.current().status, ReferralStatus::Pending);

        validator.input("Maria");
        tokio::time::sleep(Duration::from_millis(700)).await;
        assert_eq!(
            validator.current().status,
            ReferralStatus::Invalid {
                message: "No member found".to_string()
            }
        );

        // the slow "AB" reply lands now and must not overwrite "Maria"
        tokio::time::sleep(Duration::from_millis(2_000)).await;
        let field = validator.current();
        assert_eq!(field.input, "Maria");
        assert!(!field.status.is_valid());
        assert_eq!(lookup.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_timer_never_marks_pending() {
        let lookup = Arc::new(FakeLookup::default());
        let validator = validator(Arc::clone(&lookup));

        validator.input("AB");
        tokio::time::sleep(Duration::from_millis(499)).await;
        validator.input("ABC");

        // the "AB" timer fires now and must leave the newer value alone
        tokio::time::sleep(Duration::from_millis(100)).await;
        let field = validator.current();
        assert_eq!(field.input, "ABC");
        assert_eq!(field.status, ReferralStatus::Idle);
        assert!(lookup.calls.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(validator.current().status.is_valid());
        assert_eq!(*lookup.calls.lock().unwrap(), vec!["ABC".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_input_schedules_nothing() {
        let lookup = Arc::new(FakeLookup::default());
        let validator = validator(Arc::clone(&lookup));

        validator.input("69");
        validator.input("");
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(lookup.calls.lock().unwrap().is_empty());
        assert_eq!(validator.current().status, ReferralStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_failure_is_shown() {
        let lookup = Arc::new(FakeLookup::default());
        let validator = validator(lookup);
        let mut rx = validator.subscribe();

        validator.input("FAIL");
        let field = settled(&mut rx).await;

        assert!(matches!(field.status, ReferralStatus::Failed { .. }));
        assert!(validator.validated().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_after_success_invalidates() {
        let lookup = Arc::new(FakeLookup::default());
        let validator = validator(lookup);
        let mut rx = validator.subscribe();

        validator.input("6901234567");
        settled(&mut rx).await;
        assert_eq!(
            validator.validated().map(|d| d.referrer_id),
            Some(Some(10))
        );

        validator.input("690123456");
        assert!(validator.validated().is_none());
    }

    #[test]
    fn test_restore_validated_referral() {
        let validator = validator(Arc::new(FakeLookup::default()));
        validator.restore(&ReferralDetails {
            code_or_name: "6901234567".to_string(),
            validated: true,
            referrer_id: Some(7),
        });

        let details = validator.validated().unwrap();
        assert_eq!(details.code_or_name, "6901234567");
        assert_eq!(details.referrer_id, Some(7));
        assert_eq!(
            validator.current().status.message(),
            Some(PREVIOUSLY_VALIDATED)
        );
    }
}
