//! In-memory `RunStore`: the persistence seam named by the analysis API.
//! No real database ships here; this is what the CLI's `--out` flag and
//! the test suite exercise instead of a live store.

use chemverify_core::api::AuditArtifact;
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct RunStore {
    artifacts: BTreeMap<Uuid, AuditArtifact>,
}

impl RunStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, artifact: AuditArtifact) -> Uuid {
        let id = artifact.run.id;
        self.artifacts.insert(id, artifact);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<&AuditArtifact> {
        self.artifacts.get(&id)
    }
}
