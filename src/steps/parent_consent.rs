//! Parent consent step
//!
//! Shown only for verified minors. Completes once every guardian field is
//! filled, consent is accepted and the signature surface holds a drawing.

use crate::aggregate::{EnrollmentAggregate, GuardianDetails, ParentConsent, StepUpdate};
use crate::domain::ValidationError;
use crate::error::AppResult;
use crate::signature::{Point, SignatureImage, SignaturePad};

#[derive(Debug, Clone, Default)]
pub struct ParentConsentStep {
    pub guardian: GuardianDetails,
    pub consent_accepted: bool,
    pad: SignaturePad,
    /// Signature merged on an earlier visit, kept until the pad is redrawn
    restored: Option<SignatureImage>,
}

impl ParentConsentStep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resume(aggregate: &EnrollmentAggregate) -> Self {
        match aggregate.parent_consent() {
            Some(consent) => Self {
                guardian: consent.guardian.clone(),
                consent_accepted: consent.consent_accepted,
                pad: SignaturePad::default(),
                restored: Some(consent.signature.clone()),
            },
            None => Self::default(),
        }
    }

    /// Drawing surface, for rendering
    pub fn signature_pad(&self) -> &SignaturePad {
        &self.pad
    }

    /// Start a stroke; drawing replaces a restored signature
    pub fn begin_stroke(&mut self, at: Point) {
        self.restored = None;
        self.pad.begin_stroke(at);
    }

    pub fn extend_stroke(&mut self, to: Point) {
        self.restored = None;
        self.pad.extend(to);
    }

    pub fn end_stroke(&mut self) {
        self.pad.end_stroke();
    }

    pub fn clear_signature(&mut self) {
        self.pad.clear();
        self.restored = None;
    }

    pub fn has_signature(&self) -> bool {
        !self.pad.is_empty() || self.restored.is_some()
    }

    /// Guardian fields still empty, for inline marking
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.guardian.missing_fields()
    }

    /// The consent record, or the reason completion is blocked
    pub fn gate(&self) -> Result<ParentConsent, ValidationError> {
        self.guardian.validate()?;
        if !self.consent_accepted {
            return Err(ValidationError::ConsentNotAccepted);
        }
        let signature = self
            .pad
            .to_image()
            .or_else(|| self.restored.clone())
            .ok_or(ValidationError::SignatureMissing)?;

        Ok(ParentConsent {
            guardian: self.guardian.clone(),
            consent_accepted: true,
            signature,
        })
    }

    pub fn can_complete(&self) -> bool {
        self.gate().is_ok()
    }

    pub fn complete(&self) -> AppResult<StepUpdate> {
        let consent = self.gate()?;
        tracing::debug!(
            signature = %consent.signature.fingerprint(),
            strokes = self.pad.stroke_count(),
            "Parent consent completed"
        );
        Ok(StepUpdate::ParentConsent(consent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregate;
    use crate::wizard::tests::basic_info;

    fn filled() -> ParentConsentStep {
        let mut step = ParentConsentStep::new();
        step.guardian = GuardianDetails {
            full_name: "Maria Georgiou".to_string(),
            father_first_name: "Nikos".to_string(),
            father_last_name: "Georgiou".to_string(),
            mother_first_name: "Maria".to_string(),
            mother_last_name: "Georgiou".to_string(),
            birth_date: "1978-08-09".to_string(),
            id_number: "AI908388".to_string(),
            phone: "6945678901".to_string(),
            location: "Athens".to_string(),
            street: "Panepistimiou".to_string(),
            street_number: "42".to_string(),
            postal_code: "10434".to_string(),
            email: "parent@example.com".to_string(),
        };
        step.consent_accepted = true;
        step
    }

    fn sign(step: &mut ParentConsentStep) {
        step.begin_stroke(Point::new(10.0, 10.0));
        step.extend_stroke(Point::new(80.0, 40.0));
        step.end_stroke();
    }

    #[test]
    fn test_gate_order() {
        let mut step = filled();
        step.guardian.phone.clear();
        assert_eq!(
            step.gate(),
            Err(ValidationError::MissingField("parent_phone"))
        );
        assert_eq!(step.missing_fields(), vec!["parent_phone"]);

        step.guardian.phone = "6945678901".to_string();
        step.consent_accepted = false;
        assert_eq!(step.gate(), Err(ValidationError::ConsentNotAccepted));

        step.consent_accepted = true;
        assert_eq!(step.gate(), Err(ValidationError::SignatureMissing));

        sign(&mut step);
        assert!(step.can_complete());
    }

    #[test]
    fn test_cleared_signature_blocks() {
        let mut step = filled();
        sign(&mut step);
        step.clear_signature();
        assert!(!step.has_signature());
        assert_eq!(step.gate(), Err(ValidationError::SignatureMissing));
    }

    #[test]
    fn test_complete_carries_svg_signature() {
        let mut step = filled();
        sign(&mut step);

        match step.complete().unwrap() {
            StepUpdate::ParentConsent(consent) => {
                assert_eq!(consent.signature.media_type(), "image/svg+xml");
                assert!(consent.consent_accepted);
            }
            other => panic!("unexpected update: {:?}", other),
        }
    }

    #[test]
    fn test_resume_reuses_signature() {
        let mut step = filled();
        sign(&mut step);
        let aggregate = EnrollmentAggregate::default()
            .apply(basic_info(true))
            .apply(step.complete().unwrap());

        let resumed = ParentConsentStep::resume(&aggregate);
        assert!(resumed.has_signature());
        assert_eq!(resumed.guardian.full_name, "Maria Georgiou");
        assert!(resumed.can_complete());
    }

    #[test]
    fn test_rendering_pad_keeps_restored_signature() {
        let mut step = filled();
        sign(&mut step);
        let aggregate = EnrollmentAggregate::default()
            .apply(basic_info(true))
            .apply(step.complete().unwrap());

        let mut resumed = ParentConsentStep::resume(&aggregate);
        assert!(resumed.signature_pad().is_empty());
        assert!(resumed.has_signature());
        assert!(resumed.can_complete());

        // a new drawing replaces the restored signature
        resumed.begin_stroke(Point::new(5.0, 5.0));
        resumed.extend_stroke(Point::new(30.0, 60.0));
        resumed.end_stroke();
        assert_eq!(resumed.signature_pad().stroke_count(), 1);
        assert!(resumed.can_complete());
    }
}
