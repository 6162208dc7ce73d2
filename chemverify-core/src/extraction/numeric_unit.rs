//! NumericUnitExtractor: `<signed-decimal>[ws]?<unit>` claims, with
//! context-key / time-action / entity-key resolution from the
//! surrounding text window.

use super::{step_index_for, ClaimExtractor};
use crate::ids::IdGenerator;
use crate::model::{analyzed_text_locator, ClaimKind, ExtractedClaim, TextStep};
use regex::Regex;
use serde_json::json;
use std::sync::OnceLock;
use uuid::Uuid;

const CONTEXT_PRIORITY: &[&str] = &[
    "yield",
    "temp",
    "time",
    "equiv",
    "conc",
    "pressure",
    "mass",
    "volume",
    "purity",
    "conversion",
    "selectivity",
    "ee",
    "dr",
];

const GENERIC_ENTITY_TOKENS: &[&str] = &["the", "was", "with", "and", "for", "into", "from"];

fn numeric_unit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?P<num>[-+]?\d+(?:\.\d+)?)(?P<ws>\s?)(?P<unit>%|(?:\u{00B0}?C|mmol|mol|mg|mL|g|L|M|h|min|K|kPa|atm|ppm)\b)",
        )
        .unwrap()
    })
}

fn yield_word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\byield\b").unwrap())
}

fn chromatography_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:silica|column|chromatography|eluent|hexanes|EtOAc|gradient|flash|TLC|Rf)\b")
            .unwrap()
    })
}

fn solution_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:HCl|NaOH|H2SO4|aq|aqueous|solution|w/w|v/v|wt%|vol%|conc\.?|dispersion)\b",
        )
        .unwrap()
    })
}

fn context_keyword_re(word: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word))).unwrap()
}

fn time_action_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(added|stirred\s+for|maintained|heated)\b").unwrap()
    })
}

fn entity_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:[A-Z][a-zA-Z0-9]*|[a-z]+(?:ene|ane|ine|ide|ate|ite|ol|one|ium|yne))\b",
        )
        .unwrap()
    })
}

use crate::util::{char_window as window, floor_char_boundary};

fn resolve_percent_context(window_text: &str) -> &'static str {
    if yield_word_re().is_match(window_text) {
        "yield"
    } else if chromatography_re().is_match(window_text) {
        "composition"
    } else if solution_re().is_match(window_text) {
        "conc"
    } else {
        ""
    }
}

fn resolve_generic_context(window_text: &str, unit: &str) -> &'static str {
    for keyword in CONTEXT_PRIORITY {
        if context_keyword_re(keyword).is_match(window_text) {
            return keyword_to_static(keyword);
        }
    }
    if unit == "M" {
        "conc"
    } else {
        ""
    }
}

fn keyword_to_static(keyword: &str) -> &'static str {
    CONTEXT_PRIORITY
        .iter()
        .find(|k| **k == keyword)
        .copied()
        .unwrap_or("")
}

fn resolve_time_action(window_text: &str) -> Option<&'static str> {
    let caps = time_action_re().captures(window_text)?;
    let verb = caps.get(1)?.as_str().to_ascii_lowercase();
    Some(if verb.starts_with("added") {
        "addition"
    } else if verb.starts_with("stirred") {
        "stir"
    } else if verb.starts_with("maintained") {
        "hold"
    } else {
        "heat"
    })
}

fn resolve_entity_key(text: &str, claim_start: usize) -> Option<String> {
    let left_start = floor_char_boundary(text, claim_start.saturating_sub(35));
    let left_window = &text[left_start..claim_start];

    entity_token_re()
        .find_iter(left_window)
        .filter(|m| {
            let token = m.as_str();
            token.chars().count() >= 2
                && !GENERIC_ENTITY_TOKENS.contains(&token.to_ascii_lowercase().as_str())
        })
        .last()
        .map(|m| m.as_str().to_ascii_lowercase())
}

fn normalized_unit(raw_unit: &str) -> String {
    if raw_unit == "C" {
        "\u{00B0}C".to_string()
    } else {
        raw_unit.to_string()
    }
}

pub struct NumericUnitExtractor {
    _private: (),
}

impl NumericUnitExtractor {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for NumericUnitExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimExtractor for NumericUnitExtractor {
    fn name(&self) -> &'static str {
        "NumericUnitExtractor"
    }

    fn extract(
        &self,
        run_id: Uuid,
        analyzed_text: &str,
        steps: &[TextStep],
        ids: &dyn IdGenerator,
    ) -> Vec<ExtractedClaim> {
        let mut claims = Vec::new();

        for caps in numeric_unit_re().captures_iter(analyzed_text) {
            let whole = caps.get(0).unwrap();
            let num = &caps["num"];
            let raw_unit = &caps["unit"];
            let unit = normalized_unit(raw_unit);

            let (win_start, win_end) = window(analyzed_text, whole.start(), whole.end(), 40);
            let window_text = &analyzed_text[win_start..win_end];

            let context_key: &str = match unit.as_str() {
                "\u{00B0}C" | "K" => "temp",
                "h" | "min" => "time",
                "%" => resolve_percent_context(window_text),
                _ => resolve_generic_context(window_text, &unit),
            };

            let time_action = if context_key == "time" {
                resolve_time_action(window_text)
            } else {
                None
            };

            let entity_key = if matches!(unit.as_str(), "\u{00B0}C" | "K" | "h" | "min" | "%") {
                None
            } else {
                resolve_entity_key(analyzed_text, whole.start())
            };

            let mut payload = serde_json::Map::new();
            if !context_key.is_empty() {
                payload.insert("contextKey".to_string(), json!(context_key));
            }
            if let Some(action) = time_action {
                payload.insert("timeAction".to_string(), json!(action));
            }

            let step_index = step_index_for(steps, whole.start());

            claims.push(ExtractedClaim {
                id: ids.next_id(),
                run_id,
                kind: ClaimKind::NumericWithUnit,
                raw_text: whole.as_str().to_string(),
                normalized_value: num.to_string(),
                unit: Some(unit),
                payload: if payload.is_empty() {
                    None
                } else {
                    Some(serde_json::Value::Object(payload))
                },
                source_locator: analyzed_text_locator(whole.start(), whole.end()),
                entity_key,
                step_index,
            });
        }

        claims
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIdGenerator;
    use crate::segmentation::step_segmenter::segment;

    fn extract(text: &str) -> Vec<ExtractedClaim> {
        let steps = segment(text);
        let ids = SequentialIdGenerator::new();
        let run_id = Uuid::nil();
        NumericUnitExtractor::new().extract(run_id, text, &steps, &ids)
    }

    #[test]
    fn extracts_temperature_and_rewrites_bare_c() {
        let claims = extract("Heated to 78 C for 4 h.");
        let temp = claims.iter().find(|c| c.unit.as_deref() == Some("\u{00B0}C")).unwrap();
        assert_eq!(temp.normalized_value, "78");
        let time = claims.iter().find(|c| c.unit.as_deref() == Some("h")).unwrap();
        assert_eq!(time.normalized_value, "4");
    }

    #[test]
    fn percent_context_yield() {
        let claims = extract("The product was isolated in 82% yield.");
        let pct = claims.iter().find(|c| c.unit.as_deref() == Some("%")).unwrap();
        let payload = pct.payload.as_ref().unwrap();
        assert_eq!(payload["contextKey"], "yield");
    }

    #[test]
    fn percent_context_composition() {
        let claims = extract("Purified by flash chromatography on silica eluting with 30% EtOAc.");
        let pct = claims.iter().find(|c| c.unit.as_deref() == Some("%")).unwrap();
        assert_eq!(pct.payload.as_ref().unwrap()["contextKey"], "composition");
    }

    #[test]
    fn entity_key_scopes_mass_claim() {
        let claims = extract("Benzaldehyde (1.06 g, 10 mmol) was dissolved in 10 mL of MeOH.");
        let mass = claims.iter().find(|c| c.unit.as_deref() == Some("g")).unwrap();
        assert_eq!(mass.entity_key.as_deref(), Some("benzaldehyde"));
    }

    #[test]
    fn temperature_and_time_never_get_entity_key() {
        let claims = extract("NaBH4 was stirred for 2 h at 0 C.");
        for c in &claims {
            if matches!(c.unit.as_deref(), Some("h") | Some("\u{00B0}C")) {
                assert!(c.entity_key.is_none());
            }
        }
    }

    #[test]
    fn time_action_classification() {
        let claims = extract("The mixture was stirred for 2 h before workup.");
        let time = claims.iter().find(|c| c.unit.as_deref() == Some("h")).unwrap();
        assert_eq!(time.payload.as_ref().unwrap()["timeAction"], "stir");
    }
}
