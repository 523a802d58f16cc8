//! Artifact records and their invariants.
//!
//! An [`Artifact`] is an immutable value: every "edit" (level change, sub-stat
//! change, lock toggle) returns a new record. The roll simulator in [`roll`]
//! follows the same rule and never upgrades an artifact in place.

mod draw;
mod error;
pub mod roll;
mod set;

pub use draw::weighted_choice;
pub use error::{ArtifactError, RollError};
pub use roll::{num_rolls, roll_fresh, roll_to_max};
pub use set::ArtifactSet;

use arrayvec::ArrayVec;

use crate::env::OddsTables;
use crate::ids::{ArtifactId, CharacterId, SetId, Timestamp};
use crate::stats::StatKey;

/// Hard upper bound on sub-stats for any rarity.
pub const MAX_SUBSTATS: usize = 4;

/// Levels between two sub-stat rolls.
pub const LEVELS_PER_ROLL: u8 = 4;

/// Artifact rarity, a closed range 1..=5.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct Rarity(u8);

impl Rarity {
    pub const ONE: Self = Self(1);
    pub const TWO: Self = Self(2);
    pub const THREE: Self = Self(3);
    pub const FOUR: Self = Self(4);
    pub const FIVE: Self = Self(5);

    pub const ALL: [Rarity; 5] = [Self::ONE, Self::TWO, Self::THREE, Self::FOUR, Self::FIVE];

    /// Creates a rarity, rejecting values outside 1..=5.
    pub const fn new(stars: u8) -> Result<Self, ArtifactError> {
        if stars >= 1 && stars <= 5 {
            Ok(Self(stars))
        } else {
            Err(ArtifactError::InvalidRarity(stars))
        }
    }

    pub const fn stars(self) -> u8 {
        self.0
    }

    /// Zero-based index for fixed-size per-rarity tables.
    pub const fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl TryFrom<u8> for Rarity {
    type Error = ArtifactError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rarity> for u8 {
    fn from(value: Rarity) -> Self {
        value.0
    }
}

/// The five equip positions.
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
pub enum ArtifactSlot {
    Circlet,
    Flower,
    Goblet,
    Plume,
    Sands,
}

impl ArtifactSlot {
    pub const COUNT: usize = 5;

    pub const ALL: [ArtifactSlot; Self::COUNT] = [
        ArtifactSlot::Circlet,
        ArtifactSlot::Flower,
        ArtifactSlot::Goblet,
        ArtifactSlot::Plume,
        ArtifactSlot::Sands,
    ];

    /// Zero-based index for fixed-size per-slot arrays.
    pub const fn index(self) -> usize {
        match self {
            ArtifactSlot::Circlet => 0,
            ArtifactSlot::Flower => 1,
            ArtifactSlot::Goblet => 2,
            ArtifactSlot::Plume => 3,
            ArtifactSlot::Sands => 4,
        }
    }
}

/// One rolled sub-stat.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubStat {
    pub key: StatKey,
    pub value: f64,
}

impl SubStat {
    pub const fn new(key: StatKey, value: f64) -> Self {
        Self { key, value }
    }
}

/// An equippable item with a fixed main stat and up to four sub-stats.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Artifact {
    pub id: ArtifactId,
    pub slot: ArtifactSlot,
    pub rarity: Rarity,
    pub level: u8,
    pub main_stat: StatKey,
    pub set: SetId,
    pub substats: ArrayVec<SubStat, MAX_SUBSTATS>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub locked: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub owner: Option<CharacterId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub last_modified: Timestamp,
}

impl Artifact {
    /// Creates a level-0 artifact with no sub-stats.
    pub fn new(
        id: ArtifactId,
        slot: ArtifactSlot,
        rarity: Rarity,
        main_stat: StatKey,
        set: impl Into<SetId>,
    ) -> Self {
        Self {
            id,
            slot,
            rarity,
            level: 0,
            main_stat,
            set: set.into(),
            substats: ArrayVec::new(),
            locked: false,
            owner: None,
            last_modified: Timestamp::EPOCH,
        }
    }

    /// Returns the value of a sub-stat, if present.
    pub fn substat(&self, key: StatKey) -> Option<f64> {
        self.substats.iter().find(|s| s.key == key).map(|s| s.value)
    }

    pub fn has_substat(&self, key: StatKey) -> bool {
        self.substats.iter().any(|s| s.key == key)
    }

    /// Returns a copy at the given level.
    #[must_use]
    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    /// Returns a copy with the lock flag set.
    #[must_use]
    pub fn with_lock(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// Returns a copy owned by (equipped on) the given character.
    #[must_use]
    pub fn with_owner(mut self, owner: Option<CharacterId>) -> Self {
        self.owner = owner;
        self
    }

    /// Returns a copy stamped with a new last-modified time.
    #[must_use]
    pub fn touched(mut self, at: Timestamp) -> Self {
        self.last_modified = at;
        self
    }

    /// Returns a copy with `key` set to `value`.
    ///
    /// An existing sub-stat keeps its position; a new one is inserted and the
    /// list re-sorted into canonical key order.
    ///
    /// # Errors
    ///
    /// Rejects keys that cannot be sub-stats, the main stat itself, and a fifth
    /// distinct key.
    pub fn with_substat(mut self, key: StatKey, value: f64) -> Result<Self, ArtifactError> {
        if !key.is_substat() {
            return Err(ArtifactError::NotASubstat(key));
        }
        if key == self.main_stat {
            return Err(ArtifactError::SubstatEqualsMainStat(key));
        }
        if let Some(existing) = self.substats.iter_mut().find(|s| s.key == key) {
            existing.value = value;
            return Ok(self);
        }
        self.substats
            .try_push(SubStat::new(key, value))
            .map_err(|_| ArtifactError::TooManySubstats {
                count: MAX_SUBSTATS + 1,
                cap: MAX_SUBSTATS,
            })?;
        self.sort_substats();
        Ok(self)
    }

    /// Returns a copy without the given sub-stat.
    #[must_use]
    pub fn without_substat(mut self, key: StatKey) -> Self {
        self.substats.retain(|s| s.key != key);
        self
    }

    pub(crate) fn sort_substats(&mut self) {
        self.substats.sort_by_key(|s| s.key);
    }

    /// Checks every record invariant against the odds tables.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant: level above the rarity's maximum,
    /// main stat not legal for the slot, a sub-stat key that is illegal,
    /// duplicated or equal to the main stat, or more sub-stats than the
    /// rarity allows.
    pub fn validate(&self, tables: &OddsTables) -> Result<(), ArtifactError> {
        let max_level = tables.max_level(self.rarity);
        if self.level > max_level {
            return Err(ArtifactError::LevelOutOfRange {
                level: self.level,
                max: max_level,
            });
        }
        if !tables.is_legal_main_stat(self.slot, self.main_stat) {
            return Err(ArtifactError::IllegalMainStat {
                slot: self.slot,
                key: self.main_stat,
            });
        }
        let cap = tables.substat_cap(self.rarity);
        if self.substats.len() > cap {
            return Err(ArtifactError::TooManySubstats {
                count: self.substats.len(),
                cap,
            });
        }
        for (index, sub) in self.substats.iter().enumerate() {
            if !sub.key.is_substat() {
                return Err(ArtifactError::NotASubstat(sub.key));
            }
            if sub.key == self.main_stat {
                return Err(ArtifactError::SubstatEqualsMainStat(sub.key));
            }
            if self.substats[..index].iter().any(|s| s.key == sub.key) {
                return Err(ArtifactError::DuplicateSubstat(sub.key));
            }
        }
        Ok(())
    }
}
