//! Build records: a character's target configuration.

use std::collections::BTreeMap;

use crate::artifact::ArtifactSlot;
use crate::ids::{ArtifactId, BuildId, CharacterId, SetId, Timestamp, WeaponId};
use crate::stats::{OverallStatKey, StatKey};

/// Relative importance of a desired stat.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StatPriority {
    Low,
    Medium,
    High,
}

impl StatPriority {
    /// Numeric level, 1 (low) through 3 (high).
    pub const fn level(self) -> u8 {
        match self {
            StatPriority::Low => 1,
            StatPriority::Medium => 2,
            StatPriority::High => 3,
        }
    }

    pub const fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(StatPriority::Low),
            2 => Some(StatPriority::Medium),
            3 => Some(StatPriority::High),
            _ => None,
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BonusTier {
    TwoPiece,
    FourPiece,
}

impl BonusTier {
    /// Equipped pieces needed to activate the bonus.
    pub const fn pieces(self) -> usize {
        match self {
            BonusTier::TwoPiece => 2,
            BonusTier::FourPiece => 4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SetBonus {
    pub set: SetId,
    pub tier: BonusTier,
}

impl SetBonus {
    pub fn new(set: impl Into<SetId>, tier: BonusTier) -> Self {
        Self {
            set: set.into(),
            tier,
        }
    }
}

/// A lower bound on a derived stat, weighted by priority for valuation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DesiredStat {
    pub key: OverallStatKey,
    pub value: f64,
    pub priority: StatPriority,
}

impl DesiredStat {
    pub const fn new(key: OverallStatKey, value: f64, priority: StatPriority) -> Self {
        Self {
            key,
            value,
            priority,
        }
    }
}

/// A character's target configuration.
///
/// Total required set pieces should not exceed five; the evaluator does not
/// reject over-subscription.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Build {
    pub id: BuildId,
    pub character: CharacterId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub weapon: Option<WeaponId>,
    /// Acceptable main stats per slot; a missing or empty entry is unconstrained.
    #[cfg_attr(feature = "serde", serde(default))]
    pub main_stats: BTreeMap<ArtifactSlot, Vec<StatKey>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub set_bonuses: Vec<SetBonus>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub desired_stats: Vec<DesiredStat>,
    /// Artifact currently equipped in each slot.
    #[cfg_attr(feature = "serde", serde(default))]
    pub equipped: BTreeMap<ArtifactSlot, ArtifactId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub last_modified: Timestamp,
}

impl Build {
    pub fn new(id: BuildId, character: impl Into<CharacterId>) -> Self {
        Self {
            id,
            character: character.into(),
            weapon: None,
            main_stats: BTreeMap::new(),
            set_bonuses: Vec::new(),
            desired_stats: Vec::new(),
            equipped: BTreeMap::new(),
            last_modified: Timestamp::EPOCH,
        }
    }

    #[must_use]
    pub fn with_weapon(mut self, weapon: impl Into<WeaponId>) -> Self {
        self.weapon = Some(weapon.into());
        self
    }

    #[must_use]
    pub fn with_main_stats(mut self, slot: ArtifactSlot, keys: impl IntoIterator<Item = StatKey>) -> Self {
        self.main_stats.insert(slot, keys.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_set_bonus(mut self, set: impl Into<SetId>, tier: BonusTier) -> Self {
        self.set_bonuses.push(SetBonus::new(set, tier));
        self
    }

    #[must_use]
    pub fn with_desired_stat(mut self, key: OverallStatKey, value: f64, priority: StatPriority) -> Self {
        self.desired_stats.push(DesiredStat::new(key, value, priority));
        self
    }

    #[must_use]
    pub fn with_equipped(mut self, slot: ArtifactSlot, artifact: ArtifactId) -> Self {
        self.equipped.insert(slot, artifact);
        self
    }

    #[must_use]
    pub fn touched(mut self, at: Timestamp) -> Self {
        self.last_modified = at;
        self
    }

    /// Acceptable main stats for a slot; empty when unconstrained.
    pub fn desired_main_stats(&self, slot: ArtifactSlot) -> &[StatKey] {
        self.main_stats.get(&slot).map_or(&[][..], Vec::as_slice)
    }

    /// True when the slot is unconstrained or `key` is one of its acceptable main stats.
    pub fn accepts_main_stat(&self, slot: ArtifactSlot, key: StatKey) -> bool {
        let desired = self.desired_main_stats(slot);
        desired.is_empty() || desired.contains(&key)
    }

    /// Total set pieces required across all desired bonuses.
    pub fn required_pieces(&self) -> usize {
        self.set_bonuses.iter().map(|bonus| bonus.tier.pieces()).sum()
    }

    pub fn wants_set(&self, set: &SetId) -> bool {
        self.set_bonuses.iter().any(|bonus| &bonus.set == set)
    }
}
