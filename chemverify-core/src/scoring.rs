//! RiskScorer: a kind-weighted, clamped score over a run's findings.

use crate::model::{FindingKind, Status, ValidationFinding};
use crate::policy::PolicySettings;

const CHEM_HIGH_KINDS: &[FindingKind] = &[FindingKind::IncompatibleReagentSolvent, FindingKind::MissingQuench];
const CHEM_MEDIUM_KINDS: &[FindingKind] = &[
    FindingKind::MissingSolvent,
    FindingKind::MissingTemperature,
    FindingKind::AmbiguousWorkupTransition,
    FindingKind::EquivInconsistent,
];
const TEXT_INTEGRITY_KINDS: &[FindingKind] = &[
    FindingKind::MalformedChemicalToken,
    FindingKind::UnsupportedOrIncompleteClaim,
    FindingKind::CitationTraceabilityWeak,
];

const CHEM_HIGH_WEIGHT: f64 = 0.35;
const CHEM_MEDIUM_WEIGHT: f64 = 0.15;
const TEXT_INTEGRITY_WEIGHT: f64 = 0.10;

fn bucket_of(kind: FindingKind) -> Option<&'static [FindingKind]> {
    if CHEM_HIGH_KINDS.contains(&kind) {
        Some(CHEM_HIGH_KINDS)
    } else if CHEM_MEDIUM_KINDS.contains(&kind) {
        Some(CHEM_MEDIUM_KINDS)
    } else if TEXT_INTEGRITY_KINDS.contains(&kind) {
        Some(TEXT_INTEGRITY_KINDS)
    } else {
        None
    }
}

fn is_not_comparable(kind: Option<FindingKind>) -> bool {
    matches!(kind, Some(FindingKind::NotCheckable) | Some(FindingKind::NotComparable))
}

fn general_weight(finding: &ValidationFinding, policy: &PolicySettings) -> f64 {
    match finding.status {
        Status::Pass => 0.0,
        Status::Unverified => {
            if is_not_comparable(finding.kind) {
                0.05
            } else {
                0.3
            }
        }
        Status::Fail => {
            if policy.dampen_doi_fail_severity && finding.validator_name == "DoiFormatValidator" {
                0.15
            } else {
                policy.weight_for(&finding.validator_name, 1.0)
            }
        }
    }
}

/// Computes the clamped `[0, 1]` risk score for a completed set of findings.
pub fn score(findings: &[ValidationFinding], policy: &PolicySettings) -> f64 {
    let mut chem_high_count = 0usize;
    let mut chem_medium_count = 0usize;
    let mut text_integrity_count = 0usize;
    let mut general_weight_sum = 0.0;
    let mut general_count = 0usize;

    for finding in findings {
        match finding.kind.and_then(bucket_of) {
            Some(bucket) if bucket.as_ptr() == CHEM_HIGH_KINDS.as_ptr() => chem_high_count += 1,
            Some(bucket) if bucket.as_ptr() == CHEM_MEDIUM_KINDS.as_ptr() => chem_medium_count += 1,
            Some(_) => text_integrity_count += 1,
            None => {
                general_weight_sum += general_weight(finding, policy);
                general_count += 1;
            }
        }
    }

    let base = if general_count > 0 {
        general_weight_sum / general_count as f64
    } else {
        0.0
    };

    let chem = chem_high_count as f64 * CHEM_HIGH_WEIGHT + chem_medium_count as f64 * CHEM_MEDIUM_WEIGHT;
    let text_integrity = text_integrity_count as f64 * TEXT_INTEGRITY_WEIGHT;

    (base + chem + text_integrity).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ValidationFinding;
    use uuid::Uuid;

    fn finding(status: Status, kind: Option<FindingKind>, validator: &str) -> ValidationFinding {
        ValidationFinding {
            id: Uuid::nil(),
            run_id: Uuid::nil(),
            claim_id: None,
            validator_name: validator.to_string(),
            rule_id: None,
            rule_version: None,
            status,
            message: String::new(),
            confidence: 1.0,
            kind,
            payload: None,
            evidence_ref: None,
            evidence_start_offset: None,
            evidence_end_offset: None,
            evidence_step_index: None,
            evidence_entity_key: None,
            evidence_snippet: None,
        }
    }

    #[test]
    fn all_pass_scores_zero() {
        let findings = vec![finding(Status::Pass, None, "X")];
        assert_eq!(score(&findings, &PolicySettings::default()), 0.0);
    }

    #[test]
    fn chem_high_kind_contributes_flat_weight() {
        let findings = vec![finding(Status::Fail, Some(FindingKind::IncompatibleReagentSolvent), "X")];
        assert!((score(&findings, &PolicySettings::default()) - CHEM_HIGH_WEIGHT).abs() < 1e-9);
    }

    #[test]
    fn dampened_doi_fail_counts_less() {
        let findings = vec![finding(Status::Fail, None, "DoiFormatValidator")];
        let mut policy = PolicySettings::default();
        let full = score(&findings, &policy);
        policy.dampen_doi_fail_severity = true;
        let dampened = score(&findings, &policy);
        assert!(dampened < full);
    }
}
