//! How-found-us step
//!
//! Single-choice source plus, for `referral`, a debounced validated
//! identifier and, for `social`, a platform choice. Changing the source
//! discards both conditional fields.

use crate::aggregate::{
    EnrollmentAggregate, FoundUsSource, HowFoundUs, SocialPlatform, StepUpdate,
};
use crate::domain::ValidationError;
use crate::error::AppResult;

use super::referral::{ReferralField, ReferralValidator};

#[derive(Debug, Clone)]
pub struct HowFoundUsStep {
    source: Option<FoundUsSource>,
    social_platform: Option<SocialPlatform>,
    referral: ReferralValidator,
}

impl HowFoundUsStep {
    pub fn new(referral: ReferralValidator) -> Self {
        Self {
            source: None,
            social_platform: None,
            referral,
        }
    }

    /// Re-seed from a previously merged answer, including a validated
    /// referral, without repeating the lookup
    pub fn resume(referral: ReferralValidator, aggregate: &EnrollmentAggregate) -> Self {
        let mut step = Self::new(referral);
        if let Some(how_found_us) = aggregate.how_found_us() {
            step.source = Some(how_found_us.source());
            step.social_platform = how_found_us.social_platform();
            if let Some(details) = how_found_us.referral() {
                step.referral.restore(details);
            }
        }
        step
    }

    pub fn source(&self) -> Option<FoundUsSource> {
        self.source
    }

    pub fn social_platform(&self) -> Option<SocialPlatform> {
        self.social_platform
    }

    pub fn referral(&self) -> &ReferralValidator {
        &self.referral
    }

    pub fn referral_field(&self) -> ReferralField {
        self.referral.current()
    }

    /// Choose a source; a different choice clears the conditional fields
    pub fn select_source(&mut self, source: FoundUsSource) {
        if self.source == Some(source) {
            return;
        }
        self.source = Some(source);
        self.social_platform = None;
        self.referral.reset();
    }

    /// Ignored unless the source is `social`
    pub fn set_social_platform(&mut self, platform: SocialPlatform) {
        if self.source == Some(FoundUsSource::Social) {
            self.social_platform = Some(platform);
        }
    }

    /// Keystroke in the referral field; ignored unless the source is `referral`
    pub fn set_referral_input(&mut self, value: impl Into<String>) {
        if self.source == Some(FoundUsSource::Referral) {
            self.referral.input(value);
        }
    }

    /// The answer to merge, or the reason continue is blocked
    pub fn gate(&self) -> Result<HowFoundUs, ValidationError> {
        let source = self.source.ok_or(ValidationError::MissingField("how_found_us"))?;

        match source {
            FoundUsSource::Referral => {
                if self.referral.current().input.trim().is_empty() {
                    return Err(ValidationError::MissingField("referral_code_or_name"));
                }
                self.referral
                    .validated()
                    .map(HowFoundUs::Referral)
                    .ok_or(ValidationError::ReferralNotValidated)
            }
            FoundUsSource::Social => self
                .social_platform
                .map(|platform| HowFoundUs::Social { platform })
                .ok_or(ValidationError::MissingField("social_platform")),
            plain => HowFoundUs::plain(plain).ok_or(ValidationError::MissingField("how_found_us")),
        }
    }

    pub fn can_continue(&self) -> bool {
        self.gate().is_ok()
    }

    pub fn complete(&self) -> AppResult<StepUpdate> {
        Ok(StepUpdate::HowFoundUs(self.gate()?))
    }
}
