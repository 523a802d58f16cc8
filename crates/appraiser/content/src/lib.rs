//! Data-driven content for the appraiser.
//!
//! Loads the static inputs of the core from files in a data directory:
//! - Odds tables (RON), falling back to the built-in standard tables
//! - Character and weapon catalogs (RON)
//! - Valuation configuration (TOML)
//! - Artifact and build records (JSON)
//!
//! All loaders deserialize appraiser-core types directly through its `serde`
//! feature, and report failures with `anyhow` context naming the file.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    CatalogLoader, CharacterCatalog, ConfigLoader, ContentFactory, LoadResult, RecordLoader,
    TablesLoader, WeaponCatalog,
};
