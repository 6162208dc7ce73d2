//! DryInertMismatchValidator: flags an aqueous step that follows dry/inert
//! conditions with no explicit workup transition.

use super::{new_finding, ValidationContext, Validator, ValidatorMetadata};
use crate::ids::IdGenerator;
use crate::model::{ClaimKind, ExtractedClaim, FindingKind, Run, Severity, StepRole, Status, ValidationFinding};
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

fn aqueous_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(water|aqueous|H2O|brine)\b").unwrap())
}

fn workup_transition_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(quench|work-?up|workup|pour(?:ed)?\s+(?:into|onto)|added?\s+(?:to\s+)?(?:ice|water|sat\s+NH4Cl|sat\s+NaHCO3|brine)|neutrali[sz]\w*)\b",
        )
        .unwrap()
    })
}

fn is_dry_or_inert(claim: &ExtractedClaim) -> bool {
    match claim.kind {
        ClaimKind::DrynessCondition => true,
        ClaimKind::AtmosphereCondition => claim.normalized_value != "air",
        _ => false,
    }
}

pub struct DryInertMismatchValidator;

impl Validator for DryInertMismatchValidator {
    fn name(&self) -> &'static str {
        "DryInertMismatchValidator"
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            id: "dry-inert-mismatch",
            kind: Some(FindingKind::AmbiguousWorkupTransition),
            default_weight: 1.0,
            default_severity: Severity::Medium,
            description: "Flags an aqueous step after dry/inert conditions with no explicit workup transition.",
        }
    }

    fn validate(
        &self,
        run_id: Uuid,
        claims: &[ExtractedClaim],
        run: &Run,
        context: &ValidationContext,
        ids: &dyn IdGenerator,
    ) -> Vec<ValidationFinding> {
        let meta = self.metadata();
        let analyzed_text = run.analyzed_text();

        let min_dry = claims
            .iter()
            .filter(|c| is_dry_or_inert(c))
            .filter_map(|c| c.step_index)
            .min();

        let Some(min_dry) = min_dry else {
            return Vec::new();
        };

        for step in context.steps {
            if step.index <= min_dry {
                continue;
            }
            if context.role_of(step.index) != Some(StepRole::Procedure) {
                continue;
            }
            if !aqueous_re().is_match(step.text(analyzed_text)) {
                continue;
            }

            let transition_in_this_step = workup_transition_re().is_match(step.text(analyzed_text));
            let transition_between = context
                .steps
                .iter()
                .filter(|s| s.index > min_dry && s.index < step.index)
                .filter(|s| context.role_of(s.index) == Some(StepRole::Procedure))
                .any(|s| workup_transition_re().is_match(s.text(analyzed_text)));

            if transition_in_this_step || transition_between {
                return Vec::new();
            }

            return vec![new_finding(
                ids,
                run_id,
                None,
                self.name(),
                Some(&meta),
                Status::Fail,
                "An aqueous step follows dry/inert conditions with no explicit workup transition.".to_string(),
                0.6,
                Some(FindingKind::AmbiguousWorkupTransition),
                None,
                Some(crate::model::analyzed_text_locator(step.start_offset, step.end_offset)),
            )];
        }

        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api;

    #[test]
    fn aqueous_step_with_quench_language_is_not_flagged() {
        let text = "Anhydrous THF was used under nitrogen. NaBH4 was added. \
                     The reaction was quenched by addition to water and extracted with EtOAc.";
        let artifact = api::verify_text(text, None);
        assert!(!artifact
            .findings
            .iter()
            .any(|f| f.validator_name == "DryInertMismatchValidator"));
    }
}
