//! IncompleteScientificClaimValidator: flags dangling "e.g." abbreviations
//! and uncited comparative claims.

use super::{new_finding, ValidationContext, Validator, ValidatorMetadata};
use crate::ids::IdGenerator;
use crate::model::{ExtractedClaim, FindingKind, Run, Severity, Status, ValidationFinding};
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

fn eg_without_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)e\.g\.,?\s+(?:%|\u{00B0}?C|mmol|mol|mg|mL|g|L|M|h|min|K|kPa|atm|ppm)\b")
            .unwrap()
    })
}

fn comparative_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^.!?]*>[^.!?]*[.!?]").unwrap())
}

fn citation_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"10\.\d{4,9}/\S+|\[\d+\]|\([A-Z][a-zA-Z]+,?\s+\d{4}\)").unwrap())
}

pub struct IncompleteScientificClaimValidator;

impl Validator for IncompleteScientificClaimValidator {
    fn name(&self) -> &'static str {
        "IncompleteScientificClaimValidator"
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            id: "incomplete-scientific-claim",
            kind: Some(FindingKind::UnsupportedOrIncompleteClaim),
            default_weight: 1.0,
            default_severity: Severity::Low,
            description: "Flags dangling 'e.g.' abbreviations and uncited comparative claims.",
        }
    }

    fn validate(
        &self,
        run_id: Uuid,
        _claims: &[ExtractedClaim],
        run: &Run,
        _context: &ValidationContext,
        ids: &dyn IdGenerator,
    ) -> Vec<ValidationFinding> {
        let meta = self.metadata();
        let text = run.analyzed_text();
        let mut findings = Vec::new();

        for m in eg_without_number_re().find_iter(text) {
            findings.push(new_finding(
                ids,
                run_id,
                None,
                self.name(),
                Some(&meta),
                Status::Fail,
                "An 'e.g.' example names a unit with no accompanying number.".to_string(),
                0.4,
                Some(FindingKind::UnsupportedOrIncompleteClaim),
                None,
                Some(crate::model::analyzed_text_locator(m.start(), m.end())),
            ));
        }

        for m in comparative_re().find_iter(text) {
            let sentence = m.as_str();
            if citation_marker_re().is_match(sentence) {
                continue;
            }
            findings.push(new_finding(
                ids,
                run_id,
                None,
                self.name(),
                Some(&meta),
                Status::Fail,
                "A comparative claim using '>' has no supporting citation.".to_string(),
                0.4,
                Some(FindingKind::UnsupportedOrIncompleteClaim),
                None,
                Some(crate::model::analyzed_text_locator(m.start(), m.end())),
            ));
        }

        findings
    }
}
