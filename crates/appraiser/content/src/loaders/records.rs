//! Artifact and build record loaders (JSON).

use std::path::Path;

use anyhow::Context;
use appraiser_core::{Artifact, Build, OddsTables};

use crate::loaders::{LoadResult, read_file, write_file};

/// Loader for artifact and build records from JSON files.
pub struct RecordLoader;

impl RecordLoader {
    /// Load artifacts, validating each record against the odds tables.
    pub fn load_artifacts(path: &Path, tables: &OddsTables) -> LoadResult<Vec<Artifact>> {
        let content = read_file(path)?;
        let artifacts: Vec<Artifact> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse artifacts JSON {}", path.display()))?;

        for artifact in &artifacts {
            artifact
                .validate(tables)
                .with_context(|| format!("Invalid {} in {}", artifact.id, path.display()))?;
        }
        tracing::debug!(target: "content::records", count = artifacts.len(), "loaded artifacts");
        Ok(artifacts)
    }

    pub fn load_builds(path: &Path) -> LoadResult<Vec<Build>> {
        let content = read_file(path)?;
        let builds: Vec<Build> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse builds JSON {}", path.display()))?;

        tracing::debug!(target: "content::records", count = builds.len(), "loaded builds");
        Ok(builds)
    }

    pub fn save_artifacts(path: &Path, artifacts: &[Artifact]) -> LoadResult<()> {
        let json = serde_json::to_string_pretty(artifacts).context("Failed to serialize artifacts")?;
        write_file(path, &json)
    }

    pub fn save_builds(path: &Path, builds: &[Build]) -> LoadResult<()> {
        let json = serde_json::to_string_pretty(builds).context("Failed to serialize builds")?;
        write_file(path, &json)
    }
}
