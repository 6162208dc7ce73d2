//! EquivalentsConsistencyValidator: cross-checks stated `N equiv` figures
//! against the mmol claims they describe.

use super::{new_finding, ValidationContext, Validator, ValidatorMetadata};
use crate::ids::IdGenerator;
use crate::model::{ClaimKind, ExtractedClaim, FindingKind, Run, Severity, Status, ValidationFinding};
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

fn equiv_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?P<num>[-+]?\d+(?:\.\d+)?)\s*(?:equiv(?:alent)?s?|eq\.?)\b").unwrap()
    })
}

fn is_mmol_claim(claim: &ExtractedClaim) -> bool {
    claim.kind == ClaimKind::NumericWithUnit && claim.unit.as_deref() == Some("mmol")
}

pub struct EquivalentsConsistencyValidator;

impl Validator for EquivalentsConsistencyValidator {
    fn name(&self) -> &'static str {
        "EquivalentsConsistencyValidator"
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            id: "equivalents-consistency",
            kind: Some(FindingKind::EquivInconsistent),
            default_weight: 1.0,
            default_severity: Severity::Medium,
            description: "Cross-checks stated equivalents against the nearest mmol claim.",
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

        let mmol_claims: Vec<&ExtractedClaim> = claims.iter().filter(|c| is_mmol_claim(c)).collect();
        let Some(reference) = mmol_claims.first() else {
            return Vec::new();
        };
        let Ok(ref_mmol) = reference.normalized_value.parse::<f64>() else {
            return Vec::new();
        };
        let Some((ref_start, _)) = reference.locator_span() else {
            return Vec::new();
        };

        let mut findings = Vec::new();

        for caps in equiv_re().captures_iter(analyzed_text) {
            let whole = caps.get(0).unwrap();
            let Ok(stated) = caps["num"].parse::<f64>() else {
                continue;
            };

            let nearest = mmol_claims
                .iter()
                .filter(|c| c.locator_span().map(|(s, _)| s != ref_start).unwrap_or(false))
                .filter_map(|c| c.locator_span().map(|(s, _)| (c, s)))
                .min_by_key(|(_, s)| (*s as i64 - whole.start() as i64).abs())
                .filter(|(_, s)| (*s as i64 - whole.start() as i64).unsigned_abs() as usize <= 80);

            let Some((claim, _)) = nearest else {
                continue;
            };
            let Ok(reagent_mmol) = claim.normalized_value.parse::<f64>() else {
                continue;
            };

            let ratio = reagent_mmol / ref_mmol;
            let rel_err = (ratio - stated).abs() / stated.max(0.001);

            if rel_err > 0.25 {
                findings.push(new_finding(
                    ids,
                    run_id,
                    Some(claim.id),
                    self.name(),
                    Some(&meta),
                    Status::Fail,
                    format!(
                        "Stated {stated} equiv does not match the mmol ratio ({ratio:.2})."
                    ),
                    0.7,
                    Some(FindingKind::EquivInconsistent),
                    None,
                    Some(crate::model::analyzed_text_locator(whole.start(), whole.end())),
                ));
            }
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api;

    #[test]
    fn consistent_equivalents_do_not_fail() {
        let text = "Benzaldehyde (10 mmol) was dissolved in MeOH. NaBH4 (10 mmol, 1.0 equiv) was added.";
        let artifact = api::verify_text(text, None);
        assert!(!artifact
            .findings
            .iter()
            .any(|f| f.validator_name == "EquivalentsConsistencyValidator"));
    }
}
