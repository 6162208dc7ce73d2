//! ConcentrationSanityValidator: recognizes commercial `reagent in
//! solvent` forms after alias canonicalization.

use super::{new_finding, ValidationContext, Validator, ValidatorMetadata};
use crate::ids::IdGenerator;
use crate::model::{ExtractedClaim, Run, Severity, Status, ValidationFinding};
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

const ALLOWLIST: &[(&str, &str)] = &[
    ("hcl", "dioxane"),
    ("n-buli", "hexanes"),
    ("t-buli", "pentane"),
    ("bh3", "thf"),
    ("dibal", "toluene"),
    ("dibal-h", "toluene"),
    ("lah", "thf"),
    ("lialh4", "thf"),
    ("tfa", "dcm"),
    ("grignard", "thf"),
];

fn phrase_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b([A-Za-z0-9\-]+)\s+in\s+([A-Za-z0-9\-]+)\b").unwrap()
    })
}

fn canonicalize_reagent(token: &str) -> String {
    let lower = token.to_ascii_lowercase();
    match lower.as_str() {
        "buli" | "nbuli" | "n-butyllithium" => "n-buli".to_string(),
        "tbuli" | "t-butyllithium" => "t-buli".to_string(),
        "sbuli" | "s-butyllithium" => "s-buli".to_string(),
        "mgbr" | "phmgbr" | "memgbr" | "etmgbr" => "grignard".to_string(),
        "mgcl" | "phmgcl" | "memgcl" | "etmgcl" => "grignard".to_string(),
        other => other.to_string(),
    }
}

pub struct ConcentrationSanityValidator;

impl Validator for ConcentrationSanityValidator {
    fn name(&self) -> &'static str {
        "ConcentrationSanityValidator"
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            id: "concentration-sanity",
            kind: None,
            default_weight: 1.0,
            default_severity: Severity::Low,
            description: "Recognizes commercial reagent-in-solvent forms after alias canonicalization.",
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

        for caps in phrase_re().captures_iter(text) {
            let whole = caps.get(0).unwrap();
            let reagent = canonicalize_reagent(&caps[1]);
            let solvent = caps[2].to_ascii_lowercase();

            if ALLOWLIST.iter().any(|(r, s)| *r == reagent && *s == solvent) {
                findings.push(new_finding(
                    ids,
                    run_id,
                    None,
                    self.name(),
                    Some(&meta),
                    Status::Pass,
                    format!("Recognized commercial reagent form: {reagent} in {solvent}."),
                    0.5,
                    None,
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
    use crate::model::Status;

    #[test]
    fn recognized_commercial_form_passes() {
        let text = "n-BuLi in hexanes was added dropwise at -78 C.";
        let artifact = api::verify_text(text, None);
        assert!(artifact
            .findings
            .iter()
            .any(|f| f.validator_name == "ConcentrationSanityValidator" && f.status == Status::Pass));
    }
}
