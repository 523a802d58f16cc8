//! Artifact record validation errors.

use crate::env::TableError;
use crate::error::{AppraisalError, ErrorSeverity};
use crate::stats::StatKey;

use super::ArtifactSlot;

/// Errors raised when an artifact record breaks one of its invariants.
///
/// The satisfaction evaluator never raises these; they come from record
/// construction, edits, validation, and fresh-artifact generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArtifactError {
    #[error("rarity {0} is outside 1..=5")]
    InvalidRarity(u8),

    #[error("main stat {key} is not legal for the {slot} slot")]
    IllegalMainStat { slot: ArtifactSlot, key: StatKey },

    #[error("{0} cannot appear as a sub-stat")]
    NotASubstat(StatKey),

    #[error("sub-stat {0} duplicates the main stat")]
    SubstatEqualsMainStat(StatKey),

    #[error("sub-stat {0} appears more than once")]
    DuplicateSubstat(StatKey),

    #[error("{count} sub-stats exceed the cap of {cap}")]
    TooManySubstats { count: usize, cap: usize },

    #[error("level {level} exceeds the maximum of {max}")]
    LevelOutOfRange { level: u8, max: u8 },
}

impl AppraisalError for ArtifactError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        use ArtifactError::*;
        match self {
            InvalidRarity(_) => "ARTIFACT_INVALID_RARITY",
            IllegalMainStat { .. } => "ARTIFACT_ILLEGAL_MAIN_STAT",
            NotASubstat(_) => "ARTIFACT_NOT_A_SUBSTAT",
            SubstatEqualsMainStat(_) => "ARTIFACT_SUBSTAT_EQUALS_MAIN_STAT",
            DuplicateSubstat(_) => "ARTIFACT_DUPLICATE_SUBSTAT",
            TooManySubstats { .. } => "ARTIFACT_TOO_MANY_SUBSTATS",
            LevelOutOfRange { .. } => "ARTIFACT_LEVEL_OUT_OF_RANGE",
        }
    }
}

/// Errors raised while generating a fresh artifact.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RollError {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Table(#[from] TableError),
}

impl AppraisalError for RollError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            RollError::Artifact(err) => err.severity(),
            RollError::Table(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RollError::Artifact(err) => err.error_code(),
            RollError::Table(err) => err.error_code(),
        }
    }
}
