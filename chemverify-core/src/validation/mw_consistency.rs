//! MwConsistencyValidator: pairs mass and mmol claims and checks the
//! implied molecular weight falls in a plausible range.

use super::{new_finding, ValidationContext, Validator, ValidatorMetadata};
use crate::ids::IdGenerator;
use crate::model::{ClaimKind, ExtractedClaim, FindingKind, Run, Severity, Status, ValidationFinding};
use uuid::Uuid;

fn mass_in_grams(claim: &ExtractedClaim) -> Option<f64> {
    let value: f64 = claim.normalized_value.parse().ok()?;
    match claim.unit.as_deref() {
        Some("g") => Some(value),
        Some("mg") => Some(value / 1000.0),
        _ => None,
    }
}

fn mmol_value(claim: &ExtractedClaim) -> Option<f64> {
    if claim.unit.as_deref() != Some("mmol") {
        return None;
    }
    claim.normalized_value.parse().ok()
}

/// Finds the best mmol partner for `mass` among `mmol_claims`, following
/// the entity-key / same-step / distance preference order.
fn best_partner<'a>(mass: &ExtractedClaim, mmol_claims: &[&'a ExtractedClaim]) -> Option<&'a ExtractedClaim> {
    if let Some(entity) = &mass.entity_key {
        if let Some(found) = mmol_claims.iter().find(|c| c.entity_key.as_deref() == Some(entity.as_str())) {
            return Some(found);
        }
    }

    let mass_span = mass.locator_span()?;
    if let Some(found) = mmol_claims.iter().find(|c| c.step_index == mass.step_index) {
        return Some(found);
    }

    mmol_claims
        .iter()
        .filter_map(|c| c.locator_span().map(|(s, _)| (c, s)))
        .min_by_key(|(_, s)| (*s as i64 - mass_span.0 as i64).abs())
        .filter(|(_, s)| (*s as i64 - mass_span.0 as i64).unsigned_abs() as usize <= 100)
        .map(|(c, _)| *c)
}

pub struct MwConsistencyValidator;

impl Validator for MwConsistencyValidator {
    fn name(&self) -> &'static str {
        "MwConsistencyValidator"
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            id: "mw-consistency",
            kind: None,
            default_weight: 1.0,
            default_severity: Severity::Low,
            description: "Checks that paired mass/mmol claims imply a plausible molecular weight.",
        }
    }

    fn validate(
        &self,
        run_id: Uuid,
        claims: &[ExtractedClaim],
        _run: &Run,
        _context: &ValidationContext,
        ids: &dyn IdGenerator,
    ) -> Vec<ValidationFinding> {
        let meta = self.metadata();

        let mass_claims: Vec<&ExtractedClaim> = claims
            .iter()
            .filter(|c| c.kind == ClaimKind::NumericWithUnit && mass_in_grams(c).is_some())
            .collect();
        let mmol_claims: Vec<&ExtractedClaim> = claims
            .iter()
            .filter(|c| c.kind == ClaimKind::NumericWithUnit && mmol_value(c).is_some())
            .collect();

        let mut findings = Vec::new();
        let mut paired_mmol_ids = std::collections::HashSet::new();

        for mass in &mass_claims {
            let Some(partner) = best_partner(mass, &mmol_claims) else {
                continue;
            };
            if !paired_mmol_ids.insert(partner.id) {
                continue;
            }

            let Some(grams) = mass_in_grams(mass) else { continue };
            let Some(mmol) = mmol_value(partner) else { continue };
            if mmol <= 0.0 {
                continue;
            }
            let mw = grams / (mmol / 1000.0);

            if (5.0..=3000.0).contains(&mw) {
                findings.push(new_finding(
                    ids,
                    run_id,
                    Some(mass.id),
                    self.name(),
                    Some(&meta),
                    Status::Pass,
                    format!("Implied molecular weight {mw:.1} g/mol is plausible."),
                    0.8,
                    Some(FindingKind::MwConsistent),
                    None,
                    Some(mass.source_locator.clone()),
                ));
            } else {
                findings.push(new_finding(
                    ids,
                    run_id,
                    Some(mass.id),
                    self.name(),
                    Some(&meta),
                    Status::Fail,
                    format!("Implied molecular weight {mw:.1} g/mol is implausible."),
                    0.7,
                    Some(FindingKind::MwImplausible),
                    None,
                    Some(mass.source_locator.clone()),
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
    use crate::model::Status;

    #[test]
    fn plausible_mw_passes() {
        let text = "Benzaldehyde (1.06 g, 10 mmol) was dissolved in 10 mL of MeOH.";
        let artifact = api::verify_text(text, None);
        assert!(artifact
            .findings
            .iter()
            .any(|f| f.validator_name == "MwConsistencyValidator" && f.status == Status::Pass));
    }
}
