//! SARIF 2.1.0 formatter: a pure function from `AuditArtifact` to a
//! `serde_json::Value` tree, built by hand (no `sarif` crate in the
//! dependency stack) since the shape needed here is a small, fixed subset
//! of the full schema.

use chemverify_core::api::{AuditArtifact, ENGINE_VERSION};
use chemverify_core::model::Status;
use chemverify_core::validation::default_validators;
use serde_json::{json, Value};

const SCHEMA_URL: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";

fn level_for(status: Status) -> &'static str {
    match status {
        Status::Fail => "error",
        Status::Unverified => "warning",
        Status::Pass => "note",
    }
}

/// `line = number of LFs strictly before offset + 1`, matching the
/// convention documented for this formatter.
fn line_col(text: &str, offset: usize) -> (usize, usize) {
    let clamped = offset.min(text.len());
    let prefix = &text[..clamped];
    let line = prefix.bytes().filter(|&b| b == b'\n').count() + 1;
    let column = match prefix.rfind('\n') {
        Some(idx) => clamped - idx,
        None => clamped + 1,
    };
    (line, column)
}

fn rules() -> Vec<Value> {
    default_validators()
        .iter()
        .map(|v| {
            let meta = v.metadata();
            json!({
                "id": meta.id,
                "name": v.name(),
                "shortDescription": { "text": meta.description },
            })
        })
        .collect()
}

/// Renders one `AuditArtifact` as a SARIF 2.1.0 document. Only non-Pass
/// findings become results, matching the documented contract.
pub fn render(artifact: &AuditArtifact) -> Value {
    let analyzed_text = artifact.run.analyzed_text();

    let results: Vec<Value> = artifact
        .findings
        .iter()
        .filter(|f| f.status != Status::Pass)
        .map(|finding| {
            let rule_id = finding
                .rule_id
                .clone()
                .unwrap_or_else(|| finding.validator_name.clone());

            let mut result = json!({
                "ruleId": rule_id,
                "level": level_for(finding.status),
                "message": { "text": finding.message },
            });

            let location = match (finding.evidence_start_offset, finding.evidence_end_offset) {
                (Some(start), Some(end)) if !analyzed_text.is_empty() => {
                    let (start_line, start_col) = line_col(analyzed_text, start);
                    let (end_line, end_col) = line_col(analyzed_text, end);
                    Some(json!({
                        "physicalLocation": {
                            "region": {
                                "startLine": start_line,
                                "startColumn": start_col,
                                "endLine": end_line,
                                "endColumn": end_col,
                            }
                        }
                    }))
                }
                (Some(start), Some(end)) => Some(json!({
                    "physicalLocation": {
                        "region": {
                            "charOffset": start,
                            "charLength": end.saturating_sub(start),
                        }
                    }
                })),
                _ => None,
            };

            if let Some(location) = location {
                result["locations"] = json!([location]);
            }
            if let Some(snippet) = &finding.evidence_snippet {
                result["message"]["text"] =
                    json!(format!("{}\n\n{}", finding.message, snippet));
            }

            result
        })
        .collect();

    json!({
        "$schema": SCHEMA_URL,
        "version": "2.1.0",
        "runs": [{
            "tool": {
                "driver": {
                    "name": "ChemVerify",
                    "version": ENGINE_VERSION,
                    "rules": rules(),
                }
            },
            "results": results,
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chemverify_core::verify_text;

    #[test]
    fn pass_findings_are_excluded_from_results() {
        let artifact = verify_text("NaH (60% dispersion) was added portionwise to water.", None);
        let doc = render(&artifact);
        let results = doc["runs"][0]["results"].as_array().unwrap();
        assert!(!results.is_empty());
        for result in results {
            assert_ne!(result["level"], "note");
        }
    }

    #[test]
    fn line_col_counts_preceding_lfs() {
        assert_eq!(line_col("ab\ncd", 4), (2, 2));
        assert_eq!(line_col("abcd", 2), (1, 3));
    }

    #[test]
    fn driver_carries_engine_version_and_rules() {
        let artifact = verify_text("Add water.", None);
        let doc = render(&artifact);
        assert_eq!(doc["runs"][0]["tool"]["driver"]["name"], "ChemVerify");
        assert_eq!(doc["runs"][0]["tool"]["driver"]["version"], ENGINE_VERSION);
        assert!(!doc["runs"][0]["tool"]["driver"]["rules"]
            .as_array()
            .unwrap()
            .is_empty());
    }
}
