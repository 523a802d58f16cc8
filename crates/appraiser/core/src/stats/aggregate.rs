//! Stat aggregation: equipped artifacts plus character and weapon bases.

use std::collections::BTreeMap;

use strum::EnumCount;

use super::{OverallStatKey, StatKey};
use crate::artifact::ArtifactSet;
use crate::env::{Character, OddsTables, TableError, Weapon};

/// Final character stats keyed by derived stat.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct OverallStats(BTreeMap<OverallStatKey, f64>);

impl OverallStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a derived stat; zero when absent.
    pub fn get(&self, key: OverallStatKey) -> f64 {
        self.0.get(&key).copied().unwrap_or_default()
    }

    pub fn insert(&mut self, key: OverallStatKey, value: f64) {
        self.0.insert(key, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (OverallStatKey, f64)> + '_ {
        self.0.iter().map(|(key, value)| (*key, *value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(OverallStatKey, f64)> for OverallStats {
    fn from_iter<T: IntoIterator<Item = (OverallStatKey, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Value a derived stat takes before any contribution.
pub const fn stat_floor(key: StatKey) -> f64 {
    match key {
        StatKey::CritRate => 5.0,
        StatKey::CritDamage => 50.0,
        StatKey::EnergyRecharge => 100.0,
        _ => 0.0,
    }
}

/// Rounds half away from zero to one decimal place.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Per-key sums of main-stat maxima and sub-stat values over a loadout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArtifactTotals([f64; StatKey::COUNT]);

impl ArtifactTotals {
    /// Sums every equipped artifact's contributions.
    ///
    /// # Errors
    ///
    /// Fails when an artifact's main stat has no maximum for its rarity.
    pub fn collect(set: &ArtifactSet, tables: &OddsTables) -> Result<Self, TableError> {
        let mut totals = [0.0; StatKey::COUNT];
        for artifact in set.iter() {
            totals[artifact.main_stat as usize] +=
                tables.main_stat_max(artifact.rarity, artifact.main_stat)?;
            for sub in &artifact.substats {
                totals[sub.key as usize] += sub.value;
            }
        }
        Ok(Self(totals))
    }

    pub fn get(&self, key: StatKey) -> f64 {
        self.0[key as usize]
    }
}

struct Aggregator<'a> {
    totals: ArtifactTotals,
    character: &'a Character,
    weapon: Option<&'a Weapon>,
}

impl Aggregator<'_> {
    /// Artifact total plus the ascension value (or the floor) plus the weapon's stat.
    fn standard(&self, key: StatKey) -> f64 {
        let ascension = if self.character.ascension.key == key {
            self.character.ascension.value
        } else {
            stat_floor(key)
        };
        let weapon = self
            .weapon
            .and_then(|w| w.main_stat)
            .filter(|bonus| bonus.key == key)
            .map_or(0.0, |bonus| bonus.value);
        self.totals.get(key) + ascension + weapon
    }

    fn scaled(&self, base: f64, percent: StatKey, flat: StatKey) -> f64 {
        (base * (1.0 + self.standard(percent) / 100.0) + self.standard(flat)).round()
    }

    fn derive(&self, key: OverallStatKey) -> f64 {
        let weapon_base = self.weapon.map(|w| w.base).unwrap_or_default();
        let base = self.character.base;
        match key {
            OverallStatKey::Atk => {
                self.scaled(base.atk + weapon_base.atk, StatKey::AtkPercent, StatKey::Atk)
            }
            OverallStatKey::Def => {
                self.scaled(base.def + weapon_base.def, StatKey::DefPercent, StatKey::Def)
            }
            OverallStatKey::MaxHp => {
                self.scaled(base.hp + weapon_base.hp, StatKey::HpPercent, StatKey::Hp)
            }
            OverallStatKey::CritRate => round_tenth(self.standard(StatKey::CritRate)),
            OverallStatKey::CritDamage => round_tenth(self.standard(StatKey::CritDamage)),
            OverallStatKey::EnergyRecharge => round_tenth(self.standard(StatKey::EnergyRecharge)),
            OverallStatKey::ElementalMastery => self.standard(StatKey::ElementalMastery).round(),
            OverallStatKey::HealingBonus => self.standard(StatKey::HealingBonus).round(),
            OverallStatKey::PhysicalDamage => self.standard(StatKey::PhysicalDamage).round(),
            OverallStatKey::AnemoDamage => self.standard(StatKey::AnemoDamage).round(),
            OverallStatKey::CryoDamage => self.standard(StatKey::CryoDamage).round(),
            OverallStatKey::DendroDamage => self.standard(StatKey::DendroDamage).round(),
            OverallStatKey::ElectroDamage => self.standard(StatKey::ElectroDamage).round(),
            OverallStatKey::GeoDamage => self.standard(StatKey::GeoDamage).round(),
            OverallStatKey::HydroDamage => self.standard(StatKey::HydroDamage).round(),
            OverallStatKey::PyroDamage => self.standard(StatKey::PyroDamage).round(),
        }
    }
}

/// Computes every derived stat for a loadout.
///
/// ATK, DEF and max HP are `(character base + weapon base) * (1 + percent/100) + flat`,
/// rounded to an integer. Crit rate, crit damage and energy recharge are rounded to
/// one decimal, everything else to an integer. Rounding is half away from zero and
/// applied once to the full expression.
///
/// The function is pure: identical inputs give bit-identical output.
///
/// # Errors
///
/// Fails only on an incomplete odds table (a main stat with no maximum value).
pub fn compute_overall_stats(
    set: &ArtifactSet,
    character: &Character,
    weapon: Option<&Weapon>,
    tables: &OddsTables,
) -> Result<OverallStats, TableError> {
    let aggregator = Aggregator {
        totals: ArtifactTotals::collect(set, tables)?,
        character,
        weapon,
    };
    Ok(OverallStatKey::all()
        .map(|key| (key, aggregator.derive(key)))
        .collect())
}
