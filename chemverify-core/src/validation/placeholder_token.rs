//! PlaceholderTokenValidator: flags leftover template placeholders and
//! incomplete numeric fill-ins.

use super::{new_finding, ValidationContext, Validator, ValidatorMetadata};
use crate::ids::IdGenerator;
use crate::model::{ExtractedClaim, FindingKind, Run, Severity, Status, ValidationFinding};
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

fn preposition_then_punct_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:in|at|of|to|with|for)\s*[,;.!?]").unwrap()
    })
}

fn parenthesized_unit_no_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\(\s*(?:%|\u{00B0}?C|mmol|mol|mg|mL|g|L|M|h|min|K|kPa|atm|ppm)\s*\)").unwrap()
    })
}

fn triple_asterisk_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*{3,}").unwrap())
}

fn double_space_new_bond_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)new[ \t]{2,}bond").unwrap())
}

fn standalone_percent_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // No look-behind in the `regex` crate: require the char right before
    // '%' to be captured and checked as non-digit instead.
    RE.get_or_init(|| Regex::new(r"(?i)(?:yield|conversion|ee)(?:\s+\w+){0,3}\s+([^\d%]?)%").unwrap())
}

fn percent_in_parens_with_space_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(\s+%").unwrap())
}

pub struct PlaceholderTokenValidator;

impl Validator for PlaceholderTokenValidator {
    fn name(&self) -> &'static str {
        "PlaceholderTokenValidator"
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            id: "placeholder-token",
            kind: Some(FindingKind::PlaceholderOrMissingToken),
            default_weight: 1.0,
            default_severity: Severity::Low,
            description: "Flags leftover template placeholders and incomplete numeric fill-ins.",
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

        let checks: [(&Regex, &str); 6] = [
            (preposition_then_punct_re(), "A preposition is followed immediately by punctuation."),
            (parenthesized_unit_no_number_re(), "A parenthesized unit has no accompanying number."),
            (triple_asterisk_re(), "Three or more consecutive asterisks appear in the text."),
            (double_space_new_bond_re(), "'new bond' contains a double space, suggesting a template gap."),
            (standalone_percent_re(), "A standalone '%' appears with no preceding number."),
            (percent_in_parens_with_space_re(), "A '%' inside parentheses has a leading space with no number."),
        ];

        for (re, message) in checks {
            for m in re.find_iter(text) {
                findings.push(new_finding(
                    ids,
                    run_id,
                    None,
                    self.name(),
                    Some(&meta),
                    Status::Fail,
                    message.to_string(),
                    0.4,
                    Some(FindingKind::PlaceholderOrMissingToken),
                    None,
                    Some(crate::model::analyzed_text_locator(m.start(), m.end())),
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
    fn parenthesized_unit_with_no_number_fails() {
        let text = "The reaction was run at (\u{00B0}C) for some time.";
        let artifact = api::verify_text(text, None);
        assert!(artifact
            .findings
            .iter()
            .any(|f| f.validator_name == "PlaceholderTokenValidator" && f.status == Status::Fail));
    }
}
