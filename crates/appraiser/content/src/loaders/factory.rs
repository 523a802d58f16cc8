//! Content factory for building core inputs from data files.

use std::path::{Path, PathBuf};

use appraiser_core::{Artifact, Build, Catalog, OddsTables, ValuationConfig};

use crate::loaders::{CatalogLoader, ConfigLoader, LoadResult, RecordLoader, TablesLoader};

/// Content factory that loads all appraiser content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── tables.ron        (optional, standard tables when absent)
/// ├── characters.ron
/// ├── weapons.ron
/// ├── artifacts.json
/// └── builds.json
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load valuation configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<ValuationConfig> {
        ConfigLoader::load(&self.data_dir.join("config.toml"))
    }

    /// Load odds tables from `tables.ron`.
    pub fn load_tables(&self) -> LoadResult<OddsTables> {
        TablesLoader::load(&self.data_dir.join("tables.ron"))
    }

    /// Load `tables.ron` when present, else the standard tables.
    pub fn load_tables_or_standard(&self) -> LoadResult<OddsTables> {
        TablesLoader::load_or_standard(&self.data_dir.join("tables.ron"))
    }

    /// Load the catalog from `characters.ron` and `weapons.ron`.
    pub fn load_catalog(&self) -> LoadResult<Catalog> {
        CatalogLoader::load(
            &self.data_dir.join("characters.ron"),
            &self.data_dir.join("weapons.ron"),
        )
    }

    /// Load and validate artifacts from `artifacts.json`.
    pub fn load_artifacts(&self, tables: &OddsTables) -> LoadResult<Vec<Artifact>> {
        RecordLoader::load_artifacts(&self.data_dir.join("artifacts.json"), tables)
    }

    /// Load builds from `builds.json`.
    pub fn load_builds(&self) -> LoadResult<Vec<Build>> {
        RecordLoader::load_builds(&self.data_dir.join("builds.json"))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appraiser_core::{CatalogOracle, CharacterId};

    fn bundled() -> ContentFactory {
        ContentFactory::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"))
    }

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn bundled_data_loads() {
        let factory = bundled();
        let config = factory.load_config().expect("bundled config");
        assert_eq!(config, ValuationConfig::default());

        let tables = factory.load_tables_or_standard().expect("tables");
        assert_eq!(tables, OddsTables::standard());

        let catalog = factory.load_catalog().expect("bundled catalog");
        assert!(catalog.character(&CharacterId::new("hu_tao")).is_some());
    }

    #[test]
    fn missing_catalog_names_the_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = ContentFactory::new(dir.path())
            .load_catalog()
            .expect_err("no catalog files");
        assert!(format!("{err:#}").contains("characters.ron"));
    }
}
