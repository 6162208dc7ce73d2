//! Loads a named `PolicyProfile` from a TOML file on disk, falling back to
//! the two built-in profiles in `chemverify_core::policy::default_profiles`
//! when no matching file exists. The core stays free of I/O; this is where
//! that I/O lives.

use anyhow::{Context, Result};
use chemverify_core::policy::{default_profiles, PolicySettings};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
struct PolicyProfileFile {
    #[serde(default)]
    included_validators: Vec<String>,
    #[serde(default)]
    excluded_validators: Vec<String>,
    #[serde(default)]
    weight_overrides: BTreeMap<String, f64>,
    #[serde(default)]
    dampen_doi_fail_severity: bool,
}

impl From<PolicyProfileFile> for PolicySettings {
    fn from(file: PolicyProfileFile) -> Self {
        PolicySettings {
            included_validators: file.included_validators,
            excluded_validators: file.excluded_validators,
            weight_overrides: file.weight_overrides,
            dampen_doi_fail_severity: file.dampen_doi_fail_severity,
        }
    }
}

/// Resolves `name` against `<policies_dir>/<name>.toml` first, then the
/// built-in profiles, and finally `PolicySettings::default()` if `name` is
/// `None`.
pub fn resolve(policies_dir: &Path, name: Option<&str>) -> Result<PolicySettings> {
    let Some(name) = name else {
        return Ok(PolicySettings::default());
    };

    let path = policies_dir.join(format!("{name}.toml"));
    if path.exists() {
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("reading policy profile file {}", path.display()))?;
        let parsed: PolicyProfileFile = toml::from_str(&raw)
            .with_context(|| format!("parsing policy profile file {}", path.display()))?;
        return Ok(parsed.into());
    }

    default_profiles()
        .get(name)
        .cloned()
        .context(format!("no policy profile named '{name}' found on disk or built in"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn falls_back_to_builtin_profile_when_no_file_exists() {
        let dir = tempdir().unwrap();
        let settings = resolve(dir.path(), Some("ScientificTextV0")).unwrap();
        assert!(settings.dampen_doi_fail_severity);
    }

    #[test]
    fn reads_a_profile_file_when_present() {
        let dir = tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("Custom.toml")).unwrap();
        writeln!(file, "excluded_validators = [\"DoiFormatValidator\"]").unwrap();
        writeln!(file, "dampen_doi_fail_severity = true").unwrap();

        let settings = resolve(dir.path(), Some("Custom")).unwrap();
        assert!(settings.dampen_doi_fail_severity);
        assert!(!settings.is_validator_enabled("DoiFormatValidator"));
    }

    #[test]
    fn unknown_name_with_no_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(resolve(dir.path(), Some("NoSuchProfile")).is_err());
    }

    #[test]
    fn no_name_is_the_bare_default() {
        let dir = tempdir().unwrap();
        let settings = resolve(dir.path(), None).unwrap();
        assert_eq!(settings, PolicySettings::default());
    }
}
