//! Classifies the whole text as procedural vs narrative and locates the
//! references section, if any.

use regex::Regex;
use std::sync::OnceLock;

const LAB_ACTION_VERBS: &[&str] = &[
    "added", "stirred", "quenched", "extracted", "washed", "dried", "filtered", "concentrated",
    "purified", "refluxed", "cooled", "warmed", "heated", "dissolved", "evaporated", "decanted",
    "cannulated", "sonicated", "centrifuged", "distilled", "recrystallized", "precipitated",
    "titrated", "degassed", "charged", "transferred", "poured", "diluted",
];

fn lab_verb_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let alt = LAB_ACTION_VERBS.join("|");
        Regex::new(&format!(r"(?i)\b(?:{alt})\b")).unwrap()
    })
}

fn hedge_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:reported(?:ly)?|previously|in (?:prior|earlier) work|literature|was shown)\b",
        )
        .unwrap()
    })
}

fn numeric_qty_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"[-+]?\d+(?:\.\d+)?\s?(?:%|\u{00B0}?C|M|h|min|mg|mL|g|L|K|mol|mmol|kPa|atm|ppm)\b",
        )
        .unwrap()
    })
}

fn references_heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)(?:^|\n)(#{1,6}\s*)?(references|bibliography|works cited)\s*$").unwrap()
    })
}

/// Whole-text classification result.
#[derive(Debug, Clone, PartialEq)]
pub struct ProceduralContext {
    pub is_procedural: bool,
    pub step_count: usize,
    pub has_lab_action_verbs: bool,
    pub references_start_offset: Option<usize>,
}

pub(crate) fn has_lab_verbs(text: &str) -> bool {
    lab_verb_re().is_match(text)
}

pub(crate) fn has_numeric_quantity(text: &str) -> bool {
    numeric_qty_re().is_match(text)
}

/// Classifies `text` given the already-segmented step count.
pub fn detect(text: &str, step_count: usize) -> ProceduralContext {
    let lab_verb_count = lab_verb_re().find_iter(text).count();
    let hedge_count = hedge_re().find_iter(text).count();
    let has_numeric_qty = numeric_qty_re().is_match(text);

    let references_start_offset = references_heading_re().find(text).map(|m| {
        // Prefer the offset of the heading word itself, skipping any
        // leading newline consumed by the match.
        let matched = m.as_str();
        let trimmed_leading = matched.len() - matched.trim_start_matches('\n').len();
        m.start() + trimmed_leading
    });

    let hedge_dampened = hedge_count > 0 && hedge_count >= lab_verb_count;

    let is_procedural = if hedge_dampened {
        step_count >= 4
    } else {
        step_count >= 4 || (lab_verb_count >= 2 && has_numeric_qty) || lab_verb_count >= 4
    };

    ProceduralContext {
        is_procedural,
        step_count,
        has_lab_action_verbs: lab_verb_count > 0,
        references_start_offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn procedural_text_detected() {
        let text = "The flask was charged with NaH (60%, 1.2 g). The mixture was stirred for 2 h at 0 degC, then quenched with water, extracted, washed, dried, filtered, and concentrated.";
        let ctx = detect(text, 6);
        assert!(ctx.is_procedural);
        assert!(ctx.has_lab_action_verbs);
    }

    #[test]
    fn hedged_narrative_requires_more_steps() {
        let text = "It was previously reported that the reaction proceeds smoothly, as shown in the literature.";
        let ctx = detect(text, 1);
        assert!(!ctx.is_procedural);
    }

    #[test]
    fn locates_references_heading() {
        let text = "Intro.\n\nReferences\n1. Smith, J. Chem Rev 2020.";
        let ctx = detect(text, 2);
        let offset = ctx.references_start_offset.expect("heading found");
        assert_eq!(&text[offset..offset + 10], "References");
    }

    #[test]
    fn no_references_heading_returns_none() {
        let text = "Just a short narrative with no bibliography section at all.";
        let ctx = detect(text, 1);
        assert_eq!(ctx.references_start_offset, None);
    }
}
