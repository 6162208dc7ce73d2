//! Post-pass merging fragmented reference-section entries back into
//! logical bibliographic entries. Pure; never panics; degenerates to
//! identity when no references offset is supplied.

use crate::model::TextStep;
use regex::Regex;
use std::sync::OnceLock;

fn new_entry_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(?:[*\-\u{2022}]\s|\d+[.)]\s|#|---|would you like|do you want|shall we)")
            .unwrap()
    })
}

fn is_new_entry_marker(step_text: &str) -> bool {
    new_entry_re().is_match(step_text.trim_start())
}

/// Merges steps whose start offset is at or past `references_offset` that
/// are not themselves a new-entry marker into the preceding entry, then
/// renumbers the whole list densely.
pub fn merge_reference_steps(
    text: &str,
    steps: &[TextStep],
    references_offset: Option<usize>,
) -> Vec<TextStep> {
    let Some(ref_offset) = references_offset else {
        return steps.to_vec();
    };

    let mut merged: Vec<(usize, usize)> = Vec::new();
    let mut in_region_open: Option<(usize, usize)> = None;

    for step in steps {
        if step.start_offset < ref_offset {
            if let Some(open) = in_region_open.take() {
                merged.push(open);
            }
            merged.push((step.start_offset, step.end_offset));
            continue;
        }

        let step_text = step.text(text);
        let starts_new = in_region_open.is_none() || is_new_entry_marker(step_text);

        if starts_new {
            if let Some(open) = in_region_open.take() {
                merged.push(open);
            }
            in_region_open = Some((step.start_offset, step.end_offset));
        } else if let Some(open) = in_region_open.as_mut() {
            open.1 = step.end_offset;
        }
    }
    if let Some(open) = in_region_open.take() {
        merged.push(open);
    }

    merged
        .into_iter()
        .enumerate()
        .map(|(index, (start_offset, end_offset))| TextStep {
            index,
            start_offset,
            end_offset,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::step_segmenter::segment;

    #[test]
    fn identity_when_no_references_offset() {
        let text = "One. Two. Three.";
        let steps = segment(text);
        let merged = merge_reference_steps(text, &steps, None);
        assert_eq!(merged, steps);
    }

    #[test]
    fn merges_fragmented_bibliography_entries() {
        let text = "Procedure done.\nReferences\n1. Smith, J. et al.\nChem Rev 2020, 120,\n1-50.\n2. Doe, A.\nJACS 2019, 141, 100.";
        let steps = segment(text);
        let ref_offset = text.find("References").unwrap();
        let merged = merge_reference_steps(text, &steps, Some(ref_offset));
        let ref_entries: Vec<&str> = merged
            .iter()
            .filter(|s| s.start_offset >= ref_offset)
            .map(|s| s.text(text))
            .collect();
        assert_eq!(ref_entries.len(), 2);
        assert!(ref_entries[0].contains("Smith"));
        assert!(ref_entries[0].contains("Chem Rev"));
        assert!(ref_entries[1].contains("Doe"));
    }

    #[test]
    fn dense_renumbering_after_merge() {
        let text = "Procedure done.\nReferences\n1. Smith, J.\nmore text.\n2. Doe, A.";
        let steps = segment(text);
        let ref_offset = text.find("References").unwrap();
        let merged = merge_reference_steps(text, &steps, Some(ref_offset));
        for (i, s) in merged.iter().enumerate() {
            assert_eq!(s.index, i);
        }
    }
}
