//! IncompatibleReagentSolventValidator: flags moisture-sensitive reagents
//! combined with a protic/aqueous medium in the same procedure step.

use super::{new_finding, ValidationContext, Validator, ValidatorMetadata};
use crate::ids::IdGenerator;
use crate::model::{ExtractedClaim, FindingKind, Run, Severity, StepRole, Status, ValidationFinding};
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

fn moisture_sensitive_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(NaH|LAH|LiAlH4|Grignard|MgBr|MgCl|n-BuLi|t-BuLi|organolithium)\b").unwrap()
    })
}

fn protic_medium_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(water|aqueous|H2O|methanol|ethanol|isopropanol|tert-butanol|alcohol)\b")
            .unwrap()
    })
}

pub struct IncompatibleReagentSolventValidator;

impl Validator for IncompatibleReagentSolventValidator {
    fn name(&self) -> &'static str {
        "IncompatibleReagentSolventValidator"
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            id: "incompatible-reagent-solvent",
            kind: Some(FindingKind::IncompatibleReagentSolvent),
            default_weight: 1.0,
            default_severity: Severity::Critical,
            description: "Flags moisture-sensitive reagents used with a protic/aqueous medium in one step.",
        }
    }

    fn validate(
        &self,
        run_id: Uuid,
        _claims: &[ExtractedClaim],
        run: &Run,
        context: &ValidationContext,
        ids: &dyn IdGenerator,
    ) -> Vec<ValidationFinding> {
        let meta = self.metadata();
        let analyzed_text = run.analyzed_text();

        for step in context.steps {
            if context.role_of(step.index) != Some(StepRole::Procedure) {
                continue;
            }
            let step_text = step.text(analyzed_text);
            if moisture_sensitive_re().is_match(step_text) && protic_medium_re().is_match(step_text) {
                return vec![new_finding(
                    ids,
                    run_id,
                    None,
                    self.name(),
                    Some(&meta),
                    Status::Fail,
                    "A moisture-sensitive reagent is combined with a protic/aqueous medium in the same step.".to_string(),
                    0.9,
                    Some(FindingKind::IncompatibleReagentSolvent),
                    None,
                    Some(crate::model::analyzed_text_locator(step.start_offset, step.end_offset)),
                )];
            }
        }

        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api;
    use crate::model::Status;

    #[test]
    fn nah_with_water_fails() {
        let text = "NaH (60% dispersion) was added portionwise to water at 0 C.";
        let artifact = api::verify_text(text, None);
        assert!(artifact.findings.iter().any(|f| f.validator_name
            == "IncompatibleReagentSolventValidator"
            && f.status == Status::Fail));
        assert!(artifact.run.risk_score.unwrap_or(0.0) > 0.0);
    }
}
