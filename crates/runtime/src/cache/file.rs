//! File-based MetricCache implementation.

use std::fs;
use std::path::{Path, PathBuf};

use appraiser_core::{ArtifactId, BuildId};

use super::{MetricCache, MetricResult, Result};

/// Stores each metric as `metric_{artifact}_{build}.json` under a directory.
///
/// Writes go to a temporary file first and are renamed into place, so a
/// reader never sees a partial metric.
pub struct FileMetricCache {
    base_dir: PathBuf,
}

impl FileMetricCache {
    /// Opens (and creates if needed) a cache directory.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn metric_path(&self, artifact: ArtifactId, build: BuildId) -> PathBuf {
        self.base_dir
            .join(format!("metric_{}_{}.json", artifact.0, build.0))
    }

    fn parse_name(name: &str) -> Option<(ArtifactId, BuildId)> {
        let (artifact, build) = name
            .strip_prefix("metric_")?
            .strip_suffix(".json")?
            .split_once('_')?;
        Some((ArtifactId(artifact.parse().ok()?), BuildId(build.parse().ok()?)))
    }

    fn remove_where(&self, matches: impl Fn(ArtifactId, BuildId) -> bool) -> Result<()> {
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            if let Some((artifact, build)) = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(Self::parse_name)
                && matches(artifact, build)
            {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

impl MetricCache for FileMetricCache {
    fn get(&self, artifact: ArtifactId, build: BuildId) -> Result<Option<MetricResult>> {
        let path = self.metric_path(artifact, build);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn put(&self, artifact: ArtifactId, build: BuildId, metric: MetricResult) -> Result<()> {
        let path = self.metric_path(artifact, build);
        let temp_path = path.with_extension("json.tmp");

        fs::write(&temp_path, serde_json::to_vec(&metric)?)?;
        fs::rename(&temp_path, &path)?;

        tracing::trace!(target: "runtime::cache", "Saved metric {} / {}", artifact, build);
        Ok(())
    }

    fn invalidate_artifact(&self, artifact: ArtifactId) -> Result<()> {
        self.remove_where(|id, _| id == artifact)
    }

    fn invalidate_build(&self, build: BuildId) -> Result<()> {
        self.remove_where(|_, id| id == build)
    }
}
