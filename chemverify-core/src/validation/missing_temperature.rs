//! MissingTemperatureWhenImpliedValidator: flags thermal-control language
//! with no accompanying temperature claim.

use super::{new_finding, ValidationContext, Validator, ValidatorMetadata};
use crate::ids::IdGenerator;
use crate::model::{ClaimKind, ExtractedClaim, FindingKind, Run, Severity, Status, ValidationFinding};
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

fn thermal_cue_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(dropwise|exotherm(?:ic)?|cooling bath|cryogenic|heated to|cooled to|warmed to|kept at \S+)\b",
        )
        .unwrap()
    })
}

fn stirred_at_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bstirred at (\S+)").unwrap())
}

/// `regex` has no look-around, so the "stirred at X" cue (where X is not
/// rt/room/ambient) is matched unconditionally and the excluded bindings
/// are filtered out of the captures in code instead.
fn has_non_ambient_stirred_at(text: &str) -> bool {
    stirred_at_re().captures_iter(text).any(|cap| {
        let token = cap.get(1).map(|m| m.as_str()).unwrap_or("");
        let word: String = token
            .chars()
            .take_while(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        !matches!(word.as_str(), "rt" | "room" | "ambient")
    })
}

fn has_thermal_cue(text: &str) -> bool {
    thermal_cue_re().is_match(text) || has_non_ambient_stirred_at(text)
}

fn claim_signals_temperature(claim: &ExtractedClaim) -> bool {
    if claim.kind == ClaimKind::SymbolicTemperature {
        return true;
    }
    if claim.kind == ClaimKind::NumericWithUnit {
        if let Some(payload) = &claim.payload {
            if payload.get("contextKey").and_then(|v| v.as_str()) == Some("temp") {
                return true;
            }
        }
    }
    false
}

pub struct MissingTemperatureWhenImpliedValidator;

impl Validator for MissingTemperatureWhenImpliedValidator {
    fn name(&self) -> &'static str {
        "MissingTemperatureWhenImpliedValidator"
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            id: "missing-temperature",
            kind: Some(FindingKind::MissingTemperature),
            default_weight: 1.0,
            default_severity: Severity::Medium,
            description: "Flags thermal-control language with no accompanying temperature claim.",
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

        if !has_thermal_cue(analyzed_text) {
            return Vec::new();
        }
        if claims.iter().any(claim_signals_temperature) {
            return Vec::new();
        }

        vec![new_finding(
            ids,
            run_id,
            None,
            self.name(),
            Some(&meta),
            Status::Fail,
            "Thermal control is implied but no temperature is stated.".to_string(),
            0.6,
            Some(FindingKind::MissingTemperature),
            None,
            None,
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api;
    use crate::model::Status;

    #[test]
    fn dropwise_without_temperature_fails() {
        let text = "Reagent was added dropwise and the mixture was stirred for 2 h in THF.";
        let artifact = api::verify_text(text, None);
        assert!(artifact.findings.iter().any(|f| f.validator_name
            == "MissingTemperatureWhenImpliedValidator"
            && f.status == Status::Fail));
    }

    #[test]
    fn room_temperature_stirring_is_not_flagged() {
        let text = "The mixture was stirred at room temperature for 2 h in THF.";
        let artifact = api::verify_text(text, None);
        assert!(!artifact
            .findings
            .iter()
            .any(|f| f.validator_name == "MissingTemperatureWhenImpliedValidator"));
    }
}
