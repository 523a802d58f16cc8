//! Build satisfaction: does a loadout meet a build's declared requirements?
//!
//! Three independent checks are ANDed into the verdict:
//!
//! - **Main stats**: every constrained slot holds an artifact whose main stat
//!   is acceptable. Unconstrained slots are skipped and produce no detail.
//! - **Set bonuses**: each desired bonus has enough equipped pieces.
//! - **Stat thresholds**: each desired derived stat reaches its target.
//!
//! The evaluator is deterministic and never validates artifact records.

use crate::artifact::{ArtifactSet, ArtifactSlot};
use crate::build::{Build, SetBonus};
use crate::env::{Character, OddsTables, TableError, Weapon};
use crate::stats::{OverallStatKey, OverallStats, StatKey, compute_overall_stats};

/// Where stat thresholds come from.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum TargetSource {
    /// The build's declared target values.
    #[default]
    Desired,
    /// The values a reference loadout already achieves, for comparing a
    /// hypothetical swap against the current output.
    Achieved(OverallStats),
}

/// How many pieces a set bonus needs.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SetBonusMode {
    /// Four pieces for a four-piece bonus, two for a two-piece bonus.
    #[default]
    Strict,
    /// One piece fewer, for partially equipped hypothetical loadouts.
    Relaxed,
}

impl SetBonusMode {
    pub fn required_pieces(self, bonus: &SetBonus) -> usize {
        match self {
            SetBonusMode::Strict => bonus.tier.pieces(),
            SetBonusMode::Relaxed => bonus.tier.pieces().saturating_sub(1),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvaluateOptions {
    pub target: TargetSource,
    pub set_bonus_mode: SetBonusMode,
}

impl EvaluateOptions {
    pub fn achieved(reference: OverallStats) -> Self {
        Self {
            target: TargetSource::Achieved(reference),
            set_bonus_mode: SetBonusMode::Strict,
        }
    }

    #[must_use]
    pub fn relaxed(mut self) -> Self {
        self.set_bonus_mode = SetBonusMode::Relaxed;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MainStatDetail {
    pub slot: ArtifactSlot,
    pub accepted: Vec<StatKey>,
    /// Main stat of the equipped artifact, if any.
    pub actual: Option<StatKey>,
    pub satisfied: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SetBonusDetail {
    pub bonus: SetBonus,
    pub equipped: usize,
    pub required: usize,
    pub satisfied: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatDetail {
    pub key: OverallStatKey,
    pub target: f64,
    pub achieved: f64,
    pub satisfied: bool,
}

/// Per-criterion details and the overall verdict.
#[derive(Clone, Debug, PartialEq)]
pub struct SatisfactionResult {
    pub main_stats: Vec<MainStatDetail>,
    pub set_bonuses: Vec<SetBonusDetail>,
    pub stats: Vec<StatDetail>,
    pub satisfied: bool,
}

impl SatisfactionResult {
    pub fn main_stats_satisfied(&self) -> bool {
        self.main_stats.iter().all(|d| d.satisfied)
    }

    pub fn set_bonuses_satisfied(&self) -> bool {
        self.set_bonuses.iter().all(|d| d.satisfied)
    }

    pub fn stats_satisfied(&self) -> bool {
        self.stats.iter().all(|d| d.satisfied)
    }
}

fn main_stat_details(set: &ArtifactSet, build: &Build) -> Vec<MainStatDetail> {
    ArtifactSlot::ALL
        .iter()
        .filter(|slot| !build.desired_main_stats(**slot).is_empty())
        .map(|slot| {
            let accepted = build.desired_main_stats(*slot).to_vec();
            let actual = set.get(*slot).map(|artifact| artifact.main_stat);
            let satisfied = actual.is_some_and(|key| accepted.contains(&key));
            MainStatDetail {
                slot: *slot,
                accepted,
                actual,
                satisfied,
            }
        })
        .collect()
}

fn set_bonus_details(set: &ArtifactSet, build: &Build, mode: SetBonusMode) -> Vec<SetBonusDetail> {
    build
        .set_bonuses
        .iter()
        .map(|bonus| {
            let equipped = set.count_set(&bonus.set);
            let required = mode.required_pieces(bonus);
            SetBonusDetail {
                bonus: bonus.clone(),
                equipped,
                required,
                satisfied: equipped >= required,
            }
        })
        .collect()
}

/// Evaluates a loadout against a build.
///
/// # Errors
///
/// Fails only when stat aggregation hits an incomplete odds table.
pub fn evaluate(
    set: &ArtifactSet,
    build: &Build,
    character: &Character,
    weapon: Option<&Weapon>,
    tables: &OddsTables,
    options: &EvaluateOptions,
) -> Result<SatisfactionResult, TableError> {
    let main_stats = main_stat_details(set, build);
    let set_bonuses = set_bonus_details(set, build, options.set_bonus_mode);

    let stats = if build.desired_stats.is_empty() {
        Vec::new()
    } else {
        let achieved = compute_overall_stats(set, character, weapon, tables)?;
        build
            .desired_stats
            .iter()
            .map(|desired| {
                let target = match &options.target {
                    TargetSource::Desired => desired.value,
                    TargetSource::Achieved(reference) => reference.get(desired.key),
                };
                let value = achieved.get(desired.key);
                StatDetail {
                    key: desired.key,
                    target,
                    achieved: value,
                    satisfied: value >= target,
                }
            })
            .collect()
    };

    let satisfied = main_stats.iter().all(|d| d.satisfied)
        && set_bonuses.iter().all(|d| d.satisfied)
        && stats.iter().all(|d| d.satisfied);

    Ok(SatisfactionResult {
        main_stats,
        set_bonuses,
        stats,
        satisfied,
    })
}
