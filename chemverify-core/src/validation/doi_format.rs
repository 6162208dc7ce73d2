//! DoiFormatValidator: validates `CitationDoi` claims against the DOI
//! syntax grammar and a sane length ceiling.

use super::{new_finding, ValidationContext, Validator, ValidatorMetadata};
use crate::ids::IdGenerator;
use crate::model::{ClaimKind, ExtractedClaim, FindingKind, Run, Severity, Status, ValidationFinding};
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

const MAX_DOI_LEN: usize = 256;

fn doi_grammar_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^10\.\d{4,9}/[-._;()/:A-Z0-9]+$").unwrap())
}

pub struct DoiFormatValidator;

impl Validator for DoiFormatValidator {
    fn name(&self) -> &'static str {
        "DoiFormatValidator"
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            id: "doi-format",
            kind: Some(FindingKind::CitationTraceabilityWeak),
            default_weight: 1.0,
            default_severity: Severity::Medium,
            description: "Checks DOI claims against the DOI syntax grammar.",
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
        claims
            .iter()
            .filter(|c| c.kind == ClaimKind::CitationDoi)
            .map(|claim| {
                let well_formed = claim.normalized_value.len() <= MAX_DOI_LEN
                    && doi_grammar_re().is_match(&claim.normalized_value);
                if well_formed {
                    new_finding(
                        ids,
                        run_id,
                        Some(claim.id),
                        self.name(),
                        Some(&meta),
                        Status::Pass,
                        format!("DOI '{}' is well-formed.", claim.normalized_value),
                        1.0,
                        None,
                        None,
                        Some(claim.source_locator.clone()),
                    )
                } else {
                    new_finding(
                        ids,
                        run_id,
                        Some(claim.id),
                        self.name(),
                        Some(&meta),
                        Status::Fail,
                        format!("DOI '{}' does not match the expected grammar.", claim.normalized_value),
                        0.9,
                        Some(FindingKind::CitationTraceabilityWeak),
                        None,
                        Some(claim.source_locator.clone()),
                    )
                }
            })
            .collect()
    }
}
