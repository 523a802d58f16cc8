//! Content loaders for reading appraiser data from files.

pub mod catalog;
pub mod config;
pub mod factory;
pub mod records;
pub mod tables;

pub use catalog::{CatalogLoader, CharacterCatalog, WeaponCatalog};
pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use records::RecordLoader;
pub use tables::TablesLoader;

use std::path::Path;

use anyhow::Context;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file {}", path.display()))
}

/// Helper function to write file contents, creating parent directories.
pub(crate) fn write_file(path: &Path, contents: &str) -> LoadResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("Failed to write file {}", path.display()))
}
