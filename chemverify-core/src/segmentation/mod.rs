//! Text segmentation and role classification: steps 2-5 of the pipeline
//! (`SPEC_FULL.md` §2).

pub mod procedural_context;
pub mod step_merger;
pub mod step_role;
pub mod step_segmenter;

use crate::model::{StepRole, TextStep};
pub use procedural_context::ProceduralContext;

/// Output of running the full segmentation + classification stage over a
/// piece of already-canonicalized text.
#[derive(Debug, Clone)]
pub struct SegmentedText {
    pub steps: Vec<TextStep>,
    pub roles: Vec<StepRole>,
    pub context: ProceduralContext,
}

impl SegmentedText {
    pub fn role_of(&self, step_index: usize) -> Option<StepRole> {
        self.roles.get(step_index).copied()
    }
}

/// Runs StepSegmenter -> ProceduralContextDetector -> StepMerger ->
/// StepRoleClassifier over canonical `text`.
///
/// The references offset located by the context detector is computed
/// against the *raw* segmentation so the merger can correctly re-join
/// fragmented bibliography entries; role classification then runs against
/// the merged (final) step list.
pub fn analyze(text: &str) -> SegmentedText {
    let raw_steps = step_segmenter::segment(text);
    let context = procedural_context::detect(text, raw_steps.len());
    let merged_steps =
        step_merger::merge_reference_steps(text, &raw_steps, context.references_start_offset);

    let roles = merged_steps
        .iter()
        .map(|step| step_role::classify(step.text(text), step.start_offset, context.references_start_offset))
        .collect();

    SegmentedText {
        steps: merged_steps,
        roles,
        context,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_full_procedure() {
        let text = "Benzaldehyde (1.06 g, 10 mmol) was dissolved in 10 mL of MeOH. NaBH4 (0.38 g, 10 mmol) was added in portions. The mixture was stirred for 2 h at room temperature.";
        let segmented = analyze(text);
        assert!(!segmented.steps.is_empty());
        assert!(segmented.context.is_procedural);
        assert!(segmented
            .roles
            .iter()
            .any(|r| *r == StepRole::Procedure));
    }
}
