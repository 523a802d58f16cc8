//! Static-data access errors.
//!
//! Errors related to odds-table completeness and catalog lookups.

use crate::artifact::ArtifactSlot;
use crate::error::{AppraisalError, ErrorSeverity};
use crate::ids::{CharacterId, WeaponId};
use crate::stats::StatKey;

/// Errors raised by a broken odds table.
///
/// Every variant indicates corrupt configuration rather than bad user input,
/// so all of them are fatal: the calling operation aborts instead of
/// substituting a default that could masquerade as a valid score.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum TableError {
    /// No main-stat odds were supplied for a slot.
    #[error("main-stat odds missing for the {0} slot")]
    MissingMainStatOdds(ArtifactSlot),

    /// A probability table does not sum to 1.0.
    #[error("{table} odds sum to {sum}, expected 1.0")]
    OddsSum { table: &'static str, sum: f64 },

    /// A weight or probability is negative or not finite.
    #[error("{table} contains an invalid weight {weight}")]
    InvalidWeight { table: &'static str, weight: f64 },

    /// No per-rarity table was supplied for a rarity.
    #[error("rarity table missing for {0}-star artifacts")]
    MissingRarity(u8),

    /// A sub-stat has no roll-value table for a rarity.
    #[error("roll values missing for {key} at {rarity} stars")]
    MissingRollValues { rarity: u8, key: StatKey },

    /// A sub-stat has no selection weight.
    #[error("sub-stat weight missing for {0}")]
    MissingSubstatWeight(StatKey),

    /// A main stat legal for some slot has no maximum value for a rarity.
    #[error("main-stat maximum missing for {key} at {rarity} stars")]
    MissingMainStatMax { rarity: u8, key: StatKey },

    /// A key that can never be a sub-stat appears in a sub-stat table.
    #[error("{0} cannot be a sub-stat")]
    NotASubstat(StatKey),

    /// The sub-stat cap of a rarity exceeds four, or an initial count exceeds the cap.
    #[error("sub-stat count {count} exceeds the cap for {rarity}-star artifacts")]
    SubstatCount { rarity: u8, count: usize },

    /// A weighted draw ran out of candidates before reaching the drawn value.
    #[error("weighted draw over {table} exhausted at {reached} before reaching {drawn}")]
    DrawExhausted {
        table: &'static str,
        drawn: f64,
        reached: f64,
    },
}

impl AppraisalError for TableError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        use TableError::*;
        match self {
            MissingMainStatOdds(_) => "TABLE_MISSING_MAIN_STAT_ODDS",
            OddsSum { .. } => "TABLE_ODDS_SUM",
            InvalidWeight { .. } => "TABLE_INVALID_WEIGHT",
            MissingRarity(_) => "TABLE_MISSING_RARITY",
            MissingRollValues { .. } => "TABLE_MISSING_ROLL_VALUES",
            MissingSubstatWeight(_) => "TABLE_MISSING_SUBSTAT_WEIGHT",
            MissingMainStatMax { .. } => "TABLE_MISSING_MAIN_STAT_MAX",
            NotASubstat(_) => "TABLE_NOT_A_SUBSTAT",
            SubstatCount { .. } => "TABLE_SUBSTAT_COUNT",
            DrawExhausted { .. } => "TABLE_DRAW_EXHAUSTED",
        }
    }
}

/// Errors raised when a catalog cannot resolve a reference.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("character '{0}' not found")]
    CharacterNotFound(CharacterId),

    #[error("weapon '{0}' not found")]
    WeaponNotFound(WeaponId),
}

impl AppraisalError for CatalogError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            CatalogError::CharacterNotFound(_) => "CATALOG_CHARACTER_NOT_FOUND",
            CatalogError::WeaponNotFound(_) => "CATALOG_WEAPON_NOT_FOUND",
        }
    }
}
