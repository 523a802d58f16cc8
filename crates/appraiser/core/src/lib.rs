//! Artifact appraisal core: simulation, aggregation and valuation.
//!
//! `appraiser-core` answers "is this artifact worth keeping for this build?"
//! with pure, synchronous functions over immutable records:
//!
//! - [`artifact`]: records, the five-slot [`ArtifactSet`], and the roll
//!   simulator ([`roll_to_max`], [`roll_fresh`])
//! - [`stats`]: stat keys and [`compute_overall_stats`]
//! - [`evaluate`](mod@evaluate): build satisfaction
//! - [`valuation`]: the Monte Carlo engine and the weighted set-bonus factor
//! - [`env`]: odds tables and the character/weapon catalog
//!
//! Randomness always comes from a caller-supplied [`rand::Rng`], so seeded
//! generators reproduce results exactly.
pub mod artifact;
pub mod build;
pub mod config;
pub mod env;
pub mod error;
pub mod evaluate;
pub mod ids;
pub mod stats;
pub mod valuation;

pub use artifact::{
    Artifact, ArtifactError, ArtifactSet, ArtifactSlot, MAX_SUBSTATS, Rarity, RollError, SubStat,
    num_rolls, roll_fresh, roll_to_max,
};
pub use build::{BonusTier, Build, DesiredStat, SetBonus, StatPriority};
pub use config::{PriorityWeights, ValuationConfig};
pub use env::{
    BaseStats, Catalog, CatalogError, CatalogOracle, Character, OddsTableSpec, OddsTables,
    RarityTableSpec, StatBonus, TableError, Weapon,
};
pub use error::{AppraisalError, ErrorSeverity};
pub use evaluate::{
    EvaluateOptions, MainStatDetail, SatisfactionResult, SetBonusDetail, SetBonusMode, StatDetail,
    TargetSource, evaluate,
};
pub use ids::{ArtifactId, BuildId, CharacterId, SetId, Timestamp, WeaponId};
pub use stats::{Element, OverallStatKey, OverallStats, StatKey, compute_overall_stats};
pub use valuation::{
    TrialTotals, ValuationContext, ValuationError, ValuationReport, Valuator, score_artifact,
    valuate, weighted_set_bonus_factor,
};
