//! QuenchWhenReactiveReagentValidator: reactive reagents used in a
//! procedural text must be followed by a quench/workup step.

use super::{new_finding, ValidationContext, Validator, ValidatorMetadata};
use crate::ids::IdGenerator;
use crate::model::{ClaimKind, ExtractedClaim, FindingKind, Run, Severity, StepRole, Status, ValidationFinding};
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

const REACTIVE_ROLES: &[&str] = &["reductant", "base", "organometallic"];

fn quench_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(quench|work-?up|workup|extract(?:ed)?|wash(?:ed)?|pour(?:ed)?\s+(?:into|onto)|added?\s+(?:to\s+)?(?:ice|water|sat\s+NH4Cl|sat\s+NaHCO3|brine)|neutrali[sz]\w*)\b",
        )
        .unwrap()
    })
}

fn is_reactive_reagent(claim: &ExtractedClaim) -> bool {
    if claim.kind != ClaimKind::ReagentMention {
        return false;
    }
    claim
        .payload
        .as_ref()
        .and_then(|p| p.get("role"))
        .and_then(|v| v.as_str())
        .map(|role| REACTIVE_ROLES.contains(&role))
        .unwrap_or(false)
}

pub struct QuenchWhenReactiveReagentValidator;

impl Validator for QuenchWhenReactiveReagentValidator {
    fn name(&self) -> &'static str {
        "QuenchWhenReactiveReagentValidator"
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            id: "missing-quench",
            kind: Some(FindingKind::MissingQuench),
            default_weight: 1.0,
            default_severity: Severity::Critical,
            description: "Flags reactive reagents with no subsequent quench/workup step.",
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
        if !context.is_procedural {
            return Vec::new();
        }
        let meta = self.metadata();
        let analyzed_text = run.analyzed_text();
        let references_offset = context.references_offset.unwrap_or(analyzed_text.len());

        let reactive: Vec<&ExtractedClaim> = claims
            .iter()
            .filter(|c| {
                is_reactive_reagent(c)
                    && c.locator_span().map(|(s, _)| s < references_offset).unwrap_or(false)
                    && c.step_index
                        .and_then(|idx| context.role_of(idx))
                        .map(|role| role == StepRole::Procedure)
                        .unwrap_or(false)
            })
            .collect();

        if reactive.is_empty() {
            return Vec::new();
        }

        let max_step = reactive.iter().filter_map(|c| c.step_index).max().unwrap_or(0);
        let last_reagent_end = reactive
            .iter()
            .filter(|c| c.step_index == Some(max_step))
            .filter_map(|c| c.locator_span())
            .map(|(_, e)| e)
            .max()
            .unwrap_or(0);

        let remainder_of_step = context
            .steps
            .get(max_step)
            .map(|s| {
                let start = last_reagent_end.min(s.end_offset).max(s.start_offset);
                &analyzed_text[start..s.end_offset.min(analyzed_text.len())]
            })
            .unwrap_or("");

        let later_steps_matched = context
            .steps
            .iter()
            .filter(|s| s.index > max_step && s.start_offset < references_offset)
            .any(|s| quench_re().is_match(s.text(analyzed_text)));

        if later_steps_matched || quench_re().is_match(remainder_of_step) {
            return Vec::new();
        }

        vec![new_finding(
            ids,
            run_id,
            Some(reactive[reactive.len() - 1].id),
            self.name(),
            Some(&meta),
            Status::Fail,
            "A reactive reagent is used with no subsequent quench or workup.".to_string(),
            0.8,
            Some(FindingKind::MissingQuench),
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
    fn no_quench_after_reductant_fails() {
        let text = "NaBH4 was added portionwise to the solution in MeOH at 0 C and stirred for 2 h. \
                     A second portion of NaBH4 was charged and the mixture was stirred for 1 h. \
                     The reaction was monitored by TLC until complete. No further action was taken.";
        let artifact = api::verify_text(text, None);
        assert!(artifact
            .findings
            .iter()
            .any(|f| f.validator_name == "QuenchWhenReactiveReagentValidator" && f.status == Status::Fail));
    }
}
