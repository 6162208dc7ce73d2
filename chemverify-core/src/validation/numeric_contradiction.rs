//! NumericContradictionValidator: cross-claim numeric consistency checks
//! within comparable context groups (temp/time/yield/conc), with
//! multi-scenario and entity-distinctness escape hatches.

use super::{new_finding, ValidationContext, Validator, ValidatorMetadata};
use crate::ids::IdGenerator;
use crate::model::{ClaimKind, ExtractedClaim, FindingKind, Run, Severity, Status, ValidationFinding};
use crate::util::char_window;
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

const COMPARABLE_CONTEXT_KEYS: &[&str] = &["temp", "time", "yield", "conc"];

fn multi_scenario_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)alternativ\w*|route|separate\w*|trial|condition set|variant|respective\w*")
            .unwrap()
    })
}

fn context_key_of(claim: &ExtractedClaim) -> Option<String> {
    claim
        .payload
        .as_ref()
        .and_then(|p| p.get("contextKey"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn time_action_of(claim: &ExtractedClaim) -> Option<String> {
    claim
        .payload
        .as_ref()
        .and_then(|p| p.get("timeAction"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

/// Canonical unit + value for cross-unit comparison: h collapses to min,
/// K collapses to °C.
fn canonicalize(claim: &ExtractedClaim) -> Option<(String, f64)> {
    let value: f64 = claim.normalized_value.parse().ok()?;
    match claim.unit.as_deref() {
        Some("h") => Some(("min".to_string(), value * 60.0)),
        Some("min") => Some(("min".to_string(), value)),
        Some("K") => Some(("\u{00B0}C".to_string(), value - 273.15)),
        Some("\u{00B0}C") => Some(("\u{00B0}C".to_string(), value)),
        Some(other) => Some((other.to_string(), value)),
        None => None,
    }
}

fn different_entities(a: &ExtractedClaim, b: &ExtractedClaim) -> bool {
    match (&a.entity_key, &b.entity_key) {
        (Some(ea), Some(eb)) => ea != eb,
        _ => false,
    }
}

fn window_has_multi_scenario_cue(text: &str, claim: &ExtractedClaim) -> bool {
    if let Some((start, end)) = claim.locator_span() {
        let (ws, we) = char_window(text, start, end, 80);
        multi_scenario_re().is_match(&text[ws..we])
    } else {
        false
    }
}

pub struct NumericContradictionValidator;

impl Validator for NumericContradictionValidator {
    fn name(&self) -> &'static str {
        "NumericContradictionValidator"
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata {
            id: "numeric-contradiction",
            kind: Some(FindingKind::Contradiction),
            default_weight: 1.0,
            default_severity: Severity::High,
            description: "Flags numeric claims in the same context that contradict each other.",
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
        let analyzed_text = run.analyzed_text();
        let meta = self.metadata();
        let mut findings = Vec::new();

        let numeric: Vec<&ExtractedClaim> = claims
            .iter()
            .filter(|c| c.kind == ClaimKind::NumericWithUnit)
            .collect();

        let mut groups: Vec<(String, Vec<&ExtractedClaim>)> = Vec::new();
        for claim in &numeric {
            let Some(ctx_key) = context_key_of(claim) else {
                findings.push(new_finding(
                    ids,
                    run_id,
                    Some(claim.id),
                    self.name(),
                    Some(&meta),
                    Status::Unverified,
                    "Numeric value has no comparable context; skipped.".to_string(),
                    0.05,
                    Some(FindingKind::NotComparable),
                    None,
                    Some(claim.source_locator.clone()),
                ));
                continue;
            };
            if !COMPARABLE_CONTEXT_KEYS.contains(&ctx_key.as_str()) {
                findings.push(new_finding(
                    ids,
                    run_id,
                    Some(claim.id),
                    self.name(),
                    Some(&meta),
                    Status::Unverified,
                    format!("Numeric value in context '{ctx_key}' is not comparable."),
                    0.05,
                    Some(FindingKind::NotComparable),
                    None,
                    Some(claim.source_locator.clone()),
                ));
                continue;
            }
            let Some((canon_unit, _)) = canonicalize(claim) else {
                continue;
            };
            let group_key = format!("{ctx_key}|{canon_unit}");
            match groups.iter_mut().find(|(k, _)| *k == group_key) {
                Some((_, members)) => members.push(claim),
                None => groups.push((group_key, vec![claim])),
            }
        }

        for (group_key, members) in groups {
            let ctx_key = group_key.split('|').next().unwrap_or("");
            let mut multi_scenario_triggered = false;

            'pairs: for i in 0..members.len() {
                for j in (i + 1)..members.len() {
                    if multi_scenario_triggered {
                        break 'pairs;
                    }
                    let a = members[i];
                    let b = members[j];

                    if different_entities(a, b) {
                        continue;
                    }
                    if ctx_key == "time" {
                        let (ta, tb) = (time_action_of(a), time_action_of(b));
                        if let (Some(ta), Some(tb)) = (&ta, &tb) {
                            if !ta.is_empty() && !tb.is_empty() && ta != tb {
                                continue;
                            }
                        }
                    }

                    let (Some((_, va)), Some((_, vb))) = (canonicalize(a), canonicalize(b)) else {
                        continue;
                    };
                    let avg = (va.abs() + vb.abs()) / 2.0;
                    let d = (va - vb).abs();

                    if avg > 0.0 && (d / avg * 100.0) > 50.0 {
                        let cue = window_has_multi_scenario_cue(analyzed_text, a)
                            || window_has_multi_scenario_cue(analyzed_text, b);
                        if cue {
                            let claim_ids: Vec<String> =
                                members.iter().map(|c| c.id.to_string()).collect();
                            findings.push(new_finding(
                                ids,
                                run_id,
                                None,
                                self.name(),
                                Some(&meta),
                                Status::Unverified,
                                format!(
                                    "Multiple distinct experimental regimes detected for '{ctx_key}'."
                                ),
                                0.3,
                                Some(FindingKind::MultiScenario),
                                Some(serde_json::json!({ "claimIds": claim_ids })),
                                None,
                            ));
                            multi_scenario_triggered = true;
                            continue;
                        }

                        findings.push(new_finding(
                            ids,
                            run_id,
                            Some(a.id),
                            self.name(),
                            Some(&meta),
                            Status::Fail,
                            format!(
                                "Contradictory '{ctx_key}' values: {} vs {} ({:.0}% difference).",
                                a.raw_text, b.raw_text, d / avg * 100.0
                            ),
                            1.0,
                            Some(FindingKind::Contradiction),
                            Some(serde_json::json!({ "claimIds": [a.id.to_string(), b.id.to_string()] })),
                            Some(format!("{};{}", a.source_locator, b.source_locator)),
                        ));
                    } else if (avg == 0.0 && va == vb) || (avg > 0.0 && d / avg * 100.0 <= 5.0) {
                        findings.push(new_finding(
                            ids,
                            run_id,
                            Some(a.id),
                            self.name(),
                            Some(&meta),
                            Status::Pass,
                            format!("{} \u{2248} {} ({ctx_key} consistent).", a.raw_text, b.raw_text),
                            1.0,
                            None,
                            None,
                            Some(a.source_locator.clone()),
                        ));
                    } else {
                        findings.push(new_finding(
                            ids,
                            run_id,
                            Some(a.id),
                            self.name(),
                            Some(&meta),
                            Status::Pass,
                            format!("{} and {}: no contradiction.", a.raw_text, b.raw_text),
                            1.0,
                            None,
                            None,
                            Some(a.source_locator.clone()),
                        ));
                    }
                }
            }
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api;

    #[test]
    fn time_equivalence_passes_with_approx_symbol() {
        let text = "The reaction was stirred for 2 h at room temperature. After 120 min, the mixture was quenched with water.";
        let artifact = api::verify_text(text, None);
        assert!(artifact
            .findings
            .iter()
            .any(|f| f.status == Status::Pass && f.message.contains('\u{2248}')));
    }

    #[test]
    fn multi_scenario_detected_no_contradiction() {
        let text = "The reaction was heated to 78 \u{00B0}C for 4 h. In an alternative route, the mixture was cooled to -78 \u{00B0}C before addition of the organolithium reagent.";
        let artifact = api::verify_text(text, None);
        assert!(artifact
            .findings
            .iter()
            .any(|f| f.kind == Some(FindingKind::MultiScenario)));
        assert!(!artifact
            .findings
            .iter()
            .any(|f| f.kind == Some(FindingKind::Contradiction)));
    }

    #[test]
    fn yield_contradiction_detected() {
        let text = "The product was isolated in 82% yield after column chromatography. The overall yield of the process was 15%.";
        let artifact = api::verify_text(text, None);
        assert!(artifact
            .findings
            .iter()
            .any(|f| f.kind == Some(FindingKind::Contradiction)));
        assert!(artifact.run.risk_score.unwrap_or(0.0) > 0.0);
    }
}
