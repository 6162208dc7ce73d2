//! YieldMassConsistencyValidator: checks a stated percent yield against
//! the implied yield from starting-material and product mass claims.

use super::{new_finding, ValidationContext, Validator, ValidatorMetadata};
use crate::ids::IdGenerator;
use crate::model::{ClaimKind, ExtractedClaim, FindingKind, Run, Severity, Status, ValidationFinding};
use uuid::Uuid;

fn is_yield_claim(claim: &ExtractedClaim) -> bool {
    claim.kind == ClaimKind::NumericWithUnit
        && claim.unit.as_deref() == Some("%")
        && claim
            .payload
            .as_ref()
            .and_then(|p| p.get("contextKey"))
            .and_then(|v| v.as_str())
            == Some("yield")
}

fn mass_in_mg(claim: &ExtractedClaim) -> Option<f64> {
    if claim.kind != ClaimKind::NumericWithUnit {
        return None;
    }
    let value: f64 = claim.normalized_value.parse().ok()?;
    match claim.unit.as_deref() {
        Some("g") => Some(value * 1000.0),
        Some("mg") => Some(value),
        _ => None,
    }
}

pub struct YieldMassConsistencyValidator;

impl Validator for YieldMassConsistencyValidator {
    fn name(&self) -> &'static str {
        "YieldMassConsistencyValidator"
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            id: "yield-mass-consistency",
            kind: Some(FindingKind::YieldMassInconsistent),
            default_weight: 1.0,
            default_severity: Severity::Medium,
            description: "Checks a stated percent yield against implied mass-based yield.",
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

        let Some(yield_claim) = claims.iter().rev().find(|c| is_yield_claim(c)) else {
            return Vec::new();
        };
        let Ok(stated_pct) = yield_claim.normalized_value.parse::<f64>() else {
            return Vec::new();
        };

        let mass_claims: Vec<&ExtractedClaim> = claims.iter().filter(|c| mass_in_mg(c).is_some()).collect();
        let Some(start_mass) = mass_claims.first() else {
            return Vec::new();
        };
        let Some(product_mass) = mass_claims.last() else {
            return Vec::new();
        };
        if std::ptr::eq(*start_mass, *product_mass) {
            return Vec::new();
        }

        let Some(start_mg) = mass_in_mg(start_mass) else { return Vec::new() };
        let Some(product_mg) = mass_in_mg(product_mass) else { return Vec::new() };
        if start_mg <= 0.0 {
            return Vec::new();
        }

        let implied_pct = product_mg / start_mg * 100.0;
        let ceiling = (1.0 + 0.35) * 100.0 + 5.0 / start_mg * 100.0;
        let rel_err = (implied_pct - stated_pct).abs() / stated_pct.max(0.001) * 100.0;

        if implied_pct > ceiling && rel_err > 35.0 {
            return vec![new_finding(
                ids,
                run_id,
                Some(yield_claim.id),
                self.name(),
                Some(&meta),
                Status::Fail,
                format!(
                    "Stated yield {stated_pct}% is inconsistent with the implied mass-based yield ({implied_pct:.1}%)."
                ),
                0.7,
                Some(FindingKind::YieldMassInconsistent),
                None,
                Some(yield_claim.source_locator.clone()),
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
    fn single_mass_claim_is_not_enough_to_compare() {
        let text = "The product was isolated in 82% yield.";
        let artifact = api::verify_text(text, None);
        assert!(!artifact
            .findings
            .iter()
            .any(|f| f.validator_name == "YieldMassConsistencyValidator"));
    }
}
