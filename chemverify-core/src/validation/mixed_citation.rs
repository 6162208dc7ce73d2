//! MixedCitationStyleValidator: flags text mixing DOI-style and
//! author-year citation conventions.

use super::{new_finding, ValidationContext, Validator, ValidatorMetadata};
use crate::ids::IdGenerator;
use crate::model::{ExtractedClaim, FindingKind, Run, Severity, Status, ValidationFinding};
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

fn doi_pattern_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"10\.\d{4,9}/\S+").unwrap())
}

fn author_year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\([A-Z][a-zA-Z]+(?:\s+(?:et al\.?|and [A-Z][a-zA-Z]+))?,?\s+\d{4}\)").unwrap())
}

pub struct MixedCitationStyleValidator;

impl Validator for MixedCitationStyleValidator {
    fn name(&self) -> &'static str {
        "MixedCitationStyleValidator"
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            id: "mixed-citation-style",
            kind: Some(FindingKind::CitationTraceabilityWeak),
            default_weight: 1.0,
            default_severity: Severity::Low,
            description: "Flags text that mixes DOI-style and author-year citation conventions.",
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

        if doi_pattern_re().is_match(text) && author_year_re().is_match(text) {
            return vec![new_finding(
                ids,
                run_id,
                None,
                self.name(),
                Some(&meta),
                Status::Unverified,
                "Text mixes DOI-style and author-year citation conventions.".to_string(),
                0.3,
                Some(FindingKind::CitationTraceabilityWeak),
                None,
                None,
            )];
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
    fn mixed_styles_flagged() {
        let text = "See DOI: 10.1038/s41586-020-1234-5 and (Smith, 2020).";
        let artifact = api::verify_text(text, None);
        assert!(artifact.findings.iter().any(|f| f.validator_name
            == "MixedCitationStyleValidator"
            && f.status == Status::Unverified));
    }
}
