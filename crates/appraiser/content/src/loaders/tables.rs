//! Odds table loader.

use std::path::Path;

use anyhow::Context;
use appraiser_core::{OddsTableSpec, OddsTables};

use crate::loaders::{LoadResult, read_file, write_file};

/// Loader for odds tables from RON files.
pub struct TablesLoader;

impl TablesLoader {
    /// Load and validate odds tables from a RON file.
    ///
    /// The file holds an [`OddsTableSpec`]; a table that parses but is
    /// incomplete is rejected with the validation error.
    pub fn load(path: &Path) -> LoadResult<OddsTables> {
        let content = read_file(path)?;
        let spec: OddsTableSpec = ron::from_str(&content)
            .with_context(|| format!("Failed to parse odds tables RON {}", path.display()))?;
        let tables = OddsTables::new(spec)
            .with_context(|| format!("Invalid odds tables in {}", path.display()))?;

        tracing::debug!(target: "content::tables", path = %path.display(), "loaded odds tables");
        Ok(tables)
    }

    /// Load tables from `path` if it exists, else the built-in standard tables.
    pub fn load_or_standard(path: &Path) -> LoadResult<OddsTables> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(
                target: "content::tables",
                path = %path.display(),
                "no odds tables file, using standard tables"
            );
            Ok(OddsTables::standard())
        }
    }

    /// Serialize tables to pretty-printed RON.
    pub fn to_ron_string(tables: &OddsTables) -> LoadResult<String> {
        ron::ser::to_string_pretty(&tables.to_spec(), ron::ser::PrettyConfig::default())
            .context("Failed to serialize odds tables")
    }

    /// Write tables to a RON file.
    pub fn save(path: &Path, tables: &OddsTables) -> LoadResult<()> {
        write_file(path, &Self::to_ron_string(tables)?)
    }
}
