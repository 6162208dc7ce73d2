//! ReagentRoleExtractor: reagent role tags, solvent mentions, gated
//! atmosphere conditions, dryness markers, and symbolic temperatures.

use super::{step_index_for, ClaimExtractor};
use crate::ids::IdGenerator;
use crate::model::{analyzed_text_locator, ClaimKind, ExtractedClaim, TextStep};
use regex::Regex;
use serde_json::json;
use std::sync::OnceLock;
use uuid::Uuid;

struct RoleTable {
    role: &'static str,
    tokens: &'static [&'static str],
}

const REAGENT_ROLES: &[RoleTable] = &[
    RoleTable {
        role: "reductant",
        tokens: &["NaBH4", "LAH", "LiAlH4", "DIBAL", "L-Selectride", "K-Selectride", "Red-Al"],
    },
    RoleTable {
        role: "base",
        tokens: &[
            "NaH", "NaOMe", "NaOEt", "KOtBu", "K2CO3", "Cs2CO3", "Na2CO3", "NaHCO3", "Et3N", "TEA",
            "DIPEA", "H\u{00FC}nig's", "DBU", "DMAP", "pyridine", "imidazole", "LDA", "LiHMDS",
            "NaHMDS", "KHMDS", "n-BuLi", "t-BuLi", "s-BuLi",
        ],
    },
    RoleTable {
        role: "acid",
        tokens: &[
            "HCl", "H2SO4", "HNO3", "AcOH", "TFA", "p-TsOH", "CSA", "HBF4", "H3PO4", "TfOH",
        ],
    },
    RoleTable {
        role: "oxidant",
        tokens: &[
            "mCPBA", "PDC", "PCC", "DMP", "Dess-Martin", "IBX", "TEMPO", "NaOCl", "KMnO4", "OsO4",
            "Swern", "Jones",
        ],
    },
    RoleTable {
        role: "catalyst",
        tokens: &[
            "Pd(PPh3)4", "Pd2(dba)3", "Pd(OAc)2", "PdCl2", "Ni(cod)2", "CuI", "CuBr", "ZnCl2",
        ],
    },
    RoleTable {
        role: "organometallic",
        tokens: &["Grignard", "MgBr", "MgCl", "organolithium", "organomagnesium", "organozinc"],
    },
];

const SOLVENTS: &[&str] = &[
    "THF", "DCM", "MeOH", "EtOH", "hexanes", "hexane", "EtOAc", "toluene", "DMF", "DMSO",
    "acetone", "MeCN", "CH3CN", "acetonitrile", "dioxane", "Et2O", "diethyl ether", "benzene",
    "chloroform", "CHCl3", "IPA", "isopropanol", "i-PrOH", "NMP", "methanol", "ethanol", "water",
];

fn role_regex(tokens: &'static [&'static str]) -> Regex {
    let mut sorted: Vec<&str> = tokens.to_vec();
    sorted.sort_by_key(|t| std::cmp::Reverse(t.len()));
    let alt = sorted.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join("|");
    Regex::new(&format!(r"(?i)\b(?:{alt})\b")).unwrap()
}

fn solvent_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let mut sorted: Vec<&str> = SOLVENTS.to_vec();
        sorted.sort_by_key(|t| std::cmp::Reverse(t.len()));
        let alt = sorted.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join("|");
        Regex::new(&format!(r"(?i)\b(?:{alt})\b")).unwrap()
    })
}

fn atmosphere_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:(?:under|in|purged with|flushed with|degassed with|blanketed with|sparged with|atmosphere of)\s+(?:an?\s+)?(N2|N\u{2082}|nitrogen|argon|Ar|hydrogen|H2|H\u{2082}|inert (?:atmosphere|gas))|(?:under\s+)?(?:an\s+)?(hydrogen|H2|H\u{2082})\s+balloon|(inert atmosphere)|(inert gas)|(?:open to\s+)?(an\s+)?(air)\b)",
        )
        .unwrap()
    })
}

fn structural_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^-(?:containing|based|rich|bearing|doped|bridged|functionali[sz])").unwrap()
    })
}

fn dryness_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(anhydrous|oven-dried|flame-dried|dried\s+(?:over|under)|freshly\s+distilled)\b",
        )
        .unwrap()
    })
}

fn symbolic_temp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(room\s+temp(?:erature)?|ambient\s+temp(?:erature)?|at\s+ambient|(?:at|kept\s+at|under)\s+reflux|reflux(?:ed|ing)?|ice-?bath|ice\s+water\s+bath|rt)\b",
        )
        .unwrap()
    })
}

fn normalize_atmosphere(matched: &str) -> &'static str {
    let lower = matched.to_ascii_lowercase();
    if lower.contains("air") {
        "air"
    } else if lower.contains("hydrogen") || lower.contains("h2") {
        "hydrogen"
    } else if lower.contains("argon") || lower.ends_with(" ar") || lower == "ar" {
        "argon"
    } else {
        "nitrogen"
    }
}

pub struct ReagentRoleExtractor {
    _private: (),
}

impl ReagentRoleExtractor {
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn extract_reagent_roles(
        &self,
        run_id: Uuid,
        text: &str,
        steps: &[TextStep],
        ids: &dyn IdGenerator,
        out: &mut Vec<ExtractedClaim>,
    ) {
        for table in REAGENT_ROLES {
            let re = role_regex(table.tokens);
            for m in re.find_iter(text) {
                let step_index = step_index_for(steps, m.start());
                out.push(ExtractedClaim {
                    id: ids.next_id(),
                    run_id,
                    kind: ClaimKind::ReagentMention,
                    raw_text: m.as_str().to_string(),
                    normalized_value: m.as_str().to_string(),
                    unit: None,
                    payload: Some(json!({ "role": table.role, "token": m.as_str() })),
                    source_locator: analyzed_text_locator(m.start(), m.end()),
                    entity_key: Some(m.as_str().to_ascii_lowercase()),
                    step_index,
                });
            }
        }
    }

    fn extract_solvents(
        &self,
        run_id: Uuid,
        text: &str,
        steps: &[TextStep],
        ids: &dyn IdGenerator,
        out: &mut Vec<ExtractedClaim>,
    ) {
        for m in solvent_re().find_iter(text) {
            let step_index = step_index_for(steps, m.start());
            out.push(ExtractedClaim {
                id: ids.next_id(),
                run_id,
                kind: ClaimKind::SolventMention,
                raw_text: m.as_str().to_string(),
                normalized_value: m.as_str().to_ascii_lowercase(),
                unit: None,
                payload: None,
                source_locator: analyzed_text_locator(m.start(), m.end()),
                entity_key: None,
                step_index,
            });
        }
    }

    fn extract_atmosphere(
        &self,
        run_id: Uuid,
        text: &str,
        steps: &[TextStep],
        ids: &dyn IdGenerator,
        out: &mut Vec<ExtractedClaim>,
    ) {
        for m in atmosphere_re().find_iter(text) {
            if let Some(tail) = text.get(m.end()..) {
                if structural_suffix_re().is_match(tail) {
                    continue;
                }
            }
            let normalized = normalize_atmosphere(m.as_str());
            let step_index = step_index_for(steps, m.start());
            out.push(ExtractedClaim {
                id: ids.next_id(),
                run_id,
                kind: ClaimKind::AtmosphereCondition,
                raw_text: m.as_str().to_string(),
                normalized_value: normalized.to_string(),
                unit: None,
                payload: None,
                source_locator: analyzed_text_locator(m.start(), m.end()),
                entity_key: None,
                step_index,
            });
        }
    }

    fn extract_dryness(
        &self,
        run_id: Uuid,
        text: &str,
        steps: &[TextStep],
        ids: &dyn IdGenerator,
        out: &mut Vec<ExtractedClaim>,
    ) {
        for m in dryness_re().find_iter(text) {
            let step_index = step_index_for(steps, m.start());
            out.push(ExtractedClaim {
                id: ids.next_id(),
                run_id,
                kind: ClaimKind::DrynessCondition,
                raw_text: m.as_str().to_string(),
                normalized_value: m.as_str().to_ascii_lowercase(),
                unit: None,
                payload: None,
                source_locator: analyzed_text_locator(m.start(), m.end()),
                entity_key: None,
                step_index,
            });
        }
    }

    fn extract_symbolic_temperature(
        &self,
        run_id: Uuid,
        text: &str,
        steps: &[TextStep],
        ids: &dyn IdGenerator,
        out: &mut Vec<ExtractedClaim>,
    ) {
        for m in symbolic_temp_re().find_iter(text) {
            let lower = m.as_str().to_ascii_lowercase();
            if lower.contains("reflux") {
                let preceding_start = crate::util::floor_char_boundary(text, m.start().saturating_sub(11));
                let preceding = &text[preceding_start..m.start()];
                if preceding.to_ascii_lowercase().trim_end().ends_with("heated to") {
                    continue;
                }
            }

            let symbolic = if lower.contains("reflux") {
                "reflux"
            } else if lower.contains("ice") {
                "ice_bath"
            } else {
                "rt"
            };

            let step_index = step_index_for(steps, m.start());
            out.push(ExtractedClaim {
                id: ids.next_id(),
                run_id,
                kind: ClaimKind::SymbolicTemperature,
                raw_text: m.as_str().to_string(),
                normalized_value: symbolic.to_string(),
                unit: None,
                payload: Some(json!({ "contextKey": "temp", "symbolic": symbolic })),
                source_locator: analyzed_text_locator(m.start(), m.end()),
                entity_key: None,
                step_index,
            });
        }
    }
}

impl Default for ReagentRoleExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimExtractor for ReagentRoleExtractor {
    fn name(&self) -> &'static str {
        "ReagentRoleExtractor"
    }

    fn extract(
        &self,
        run_id: Uuid,
        analyzed_text: &str,
        steps: &[TextStep],
        ids: &dyn IdGenerator,
    ) -> Vec<ExtractedClaim> {
        let mut claims = Vec::new();
        self.extract_reagent_roles(run_id, analyzed_text, steps, ids, &mut claims);
        self.extract_solvents(run_id, analyzed_text, steps, ids, &mut claims);
        self.extract_atmosphere(run_id, analyzed_text, steps, ids, &mut claims);
        self.extract_dryness(run_id, analyzed_text, steps, ids, &mut claims);
        self.extract_symbolic_temperature(run_id, analyzed_text, steps, ids, &mut claims);
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
        ReagentRoleExtractor::new().extract(Uuid::nil(), text, &steps, &ids)
    }

    #[test]
    fn tags_reductant_role() {
        let claims = extract("NaBH4 (0.38 g, 10 mmol) was added in portions.");
        let reductant = claims
            .iter()
            .find(|c| c.kind == ClaimKind::ReagentMention)
            .unwrap();
        assert_eq!(reductant.payload.as_ref().unwrap()["role"], "reductant");
    }

    #[test]
    fn atmosphere_requires_prepositional_phrase() {
        let claims = extract("The reaction was run under nitrogen atmosphere with stirring.");
        assert!(claims.iter().any(|c| c.kind == ClaimKind::AtmosphereCondition));

        let bare = extract("Nitrogen-containing heterocycles were observed by NMR.");
        assert!(!bare.iter().any(|c| c.kind == ClaimKind::AtmosphereCondition));
    }

    #[test]
    fn atmosphere_structural_suffix_rejected() {
        let claims = extract("The substrate bears a nitrogen-rich scaffold under study.");
        assert!(!claims.iter().any(|c| c.kind == ClaimKind::AtmosphereCondition));
    }

    #[test]
    fn symbolic_temperature_room_and_reflux() {
        let claims = extract("The mixture was stirred at room temperature, then heated under reflux.");
        let rt = claims
            .iter()
            .find(|c| c.kind == ClaimKind::SymbolicTemperature && c.normalized_value == "rt");
        let reflux = claims
            .iter()
            .find(|c| c.kind == ClaimKind::SymbolicTemperature && c.normalized_value == "reflux");
        assert!(rt.is_some());
        assert!(reflux.is_some());
    }

    #[test]
    fn heated_to_reflux_excluded() {
        let claims = extract("The solution was heated to reflux overnight.");
        assert!(!claims
            .iter()
            .any(|c| c.kind == ClaimKind::SymbolicTemperature && c.normalized_value == "reflux"));
    }

    #[test]
    fn dryness_marker_detected() {
        let claims = extract("Anhydrous THF was used as solvent under nitrogen.");
        assert!(claims.iter().any(|c| c.kind == ClaimKind::DrynessCondition));
        assert!(claims.iter().any(|c| c.kind == ClaimKind::SolventMention));
    }
}
