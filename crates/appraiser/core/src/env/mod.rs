//! Read-only static data: odds tables and the character/weapon catalog.
//!
//! Nothing here is mutated by the engines. The runtime shares these behind
//! `Arc` across worker threads, so the catalog oracle is `Send + Sync`.
mod catalog;
mod error;
mod standard;
mod tables;

pub use catalog::{BaseStats, Catalog, CatalogOracle, Character, StatBonus, Weapon};
pub use error::{CatalogError, TableError};
pub use tables::{OddsTableSpec, OddsTables, RarityTableSpec, SUM_TOLERANCE};
