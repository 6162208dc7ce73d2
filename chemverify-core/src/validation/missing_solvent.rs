//! MissingSolventValidator: flags procedural text that never names a
//! recognized solvent.

use super::{new_finding, ValidationContext, Validator, ValidatorMetadata};
use crate::ids::IdGenerator;
use crate::model::{ClaimKind, ExtractedClaim, FindingKind, Run, Severity, Status, ValidationFinding};
use crate::segmentation::procedural_context::has_lab_verbs;
use uuid::Uuid;

pub struct MissingSolventValidator;

impl Validator for MissingSolventValidator {
    fn name(&self) -> &'static str {
        "MissingSolventValidator"
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            id: "missing-solvent",
            kind: Some(FindingKind::MissingSolvent),
            default_weight: 1.0,
            default_severity: Severity::Medium,
            description: "Flags procedures that never name a solvent.",
        }
    }

    fn validate(
        &self,
        run_id: Uuid,
        claims: &[ExtractedClaim],
        run: &Run,
        _context: &ValidationContext,
        ids: &dyn IdGenerator,
    ) -> Vec<ValidationFinding> {
        let meta = self.metadata();
        let analyzed_text = run.analyzed_text();

        if !has_lab_verbs(analyzed_text) {
            return Vec::new();
        }
        if claims.iter().any(|c| c.kind == ClaimKind::SolventMention) {
            return Vec::new();
        }

        vec![new_finding(
            ids,
            run_id,
            None,
            self.name(),
            Some(&meta),
            Status::Fail,
            "Procedure describes lab actions but never names a solvent.".to_string(),
            0.6,
            Some(FindingKind::MissingSolvent),
            None,
            None,
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api;
    use crate::model::Status;

    #[test]
    fn no_solvent_named_fails() {
        let text = "NaBH4 was added portionwise and the mixture was stirred for 2 h at 0 C.";
        let artifact = api::verify_text(text, None);
        assert!(artifact
            .findings
            .iter()
            .any(|f| f.validator_name == "MissingSolventValidator" && f.status == Status::Fail));
    }

    #[test]
    fn solvent_named_passes_quietly() {
        let text = "Benzaldehyde was dissolved in 10 mL of MeOH and stirred for 2 h.";
        let artifact = api::verify_text(text, None);
        assert!(!artifact
            .findings
            .iter()
            .any(|f| f.validator_name == "MissingSolventValidator"));
    }
}
