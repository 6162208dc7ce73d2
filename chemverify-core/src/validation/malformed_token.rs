//! MalformedChemicalTokenValidator: surface-level text integrity checks
//! independent of claim extraction.

use super::{new_finding, ValidationContext, Validator, ValidatorMetadata};
use crate::ids::IdGenerator;
use crate::model::{ExtractedClaim, FindingKind, Run, Severity, Status, ValidationFinding};
use regex::Regex;
use serde_json::json;
use std::sync::OnceLock;
use uuid::Uuid;

fn empty_parens_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[a-zA-Z][a-zA-Z0-9]{1,}\s*\(\s*\)").unwrap())
}

fn standalone_degc_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // No look-behind in the `regex` crate: capture the char before the
    // degree mark and check it isn't a digit instead.
    RE.get_or_init(|| Regex::new(r"(?:^|[^\d])(\u{00B0}C)\b").unwrap())
}

fn dangling_symbol_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:^|\s)[_`\\](?:\s|$)").unwrap())
}

fn double_space_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w[ \t]{2,}\w").unwrap())
}

fn empty_bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*\s*\*\*").unwrap())
}

pub struct MalformedChemicalTokenValidator;

impl Validator for MalformedChemicalTokenValidator {
    fn name(&self) -> &'static str {
        "MalformedChemicalTokenValidator"
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            id: "malformed-chemical-token",
            kind: Some(FindingKind::MalformedChemicalToken),
            default_weight: 1.0,
            default_severity: Severity::Low,
            description: "Flags malformed tokens in the raw text: empty parens, orphan degree marks, dangling symbols.",
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

        for m in empty_parens_re().find_iter(text) {
            findings.push(new_finding(
                ids, run_id, None, self.name(), Some(&meta), Status::Fail,
                "Empty parentheses follow a word.".to_string(), 0.6,
                Some(FindingKind::MalformedChemicalToken), None,
                Some(crate::model::analyzed_text_locator(m.start(), m.end())),
            ));
        }

        for m in standalone_degc_re().find_iter(text) {
            findings.push(new_finding(
                ids, run_id, None, self.name(), Some(&meta), Status::Fail,
                "A '\u{00B0}C' marker has no preceding numeric value.".to_string(), 0.6,
                Some(FindingKind::MalformedChemicalToken),
                Some(json!({ "expected": "temperature numeric value", "examples": ["78 \u{00B0}C", "0 \u{00B0}C"] })),
                Some(crate::model::analyzed_text_locator(m.start(), m.end())),
            ));
        }

        for m in dangling_symbol_re().find_iter(text) {
            findings.push(new_finding(
                ids, run_id, None, self.name(), Some(&meta), Status::Fail,
                "A dangling formatting symbol appears isolated in the text.".to_string(), 0.4,
                Some(FindingKind::MalformedChemicalToken), None,
                Some(crate::model::analyzed_text_locator(m.start(), m.end())),
            ));
        }

        for m in double_space_re().find_iter(text) {
            findings.push(new_finding(
                ids, run_id, None, self.name(), Some(&meta), Status::Fail,
                "Multiple consecutive spaces appear between words.".to_string(), 0.3,
                Some(FindingKind::MalformedChemicalToken), None,
                Some(crate::model::analyzed_text_locator(m.start(), m.end())),
            ));
        }

        for m in empty_bold_re().find_iter(text) {
            findings.push(new_finding(
                ids, run_id, None, self.name(), Some(&meta), Status::Fail,
                "An empty bold marker has no content.".to_string(), 0.3,
                Some(FindingKind::MalformedChemicalToken), None,
                Some(crate::model::analyzed_text_locator(m.start(), m.end())),
            ));
        }

        findings
    }
}
