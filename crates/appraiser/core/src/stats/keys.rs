//! Stat identifiers.
//!
//! [`StatKey`] names one atomic stat carried by an artifact, a character
//! ascension, or a weapon. [`OverallStatKey`] names a derived character stat
//! produced by the aggregation engine. They are distinct because a derived
//! stat such as final ATK combines several raw contributions with base values.
//!
//! The declaration order of [`StatKey`] is the canonical ordering used to sort
//! artifact sub-stats.

use strum::IntoEnumIterator;

/// Elements that carry a damage bonus.
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
pub enum Element {
    Physical,
    Anemo,
    Cryo,
    Dendro,
    Electro,
    Geo,
    Hydro,
    Pyro,
}

/// One atomic stat.
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
    strum::EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StatKey {
    Hp,
    HpPercent,
    Atk,
    AtkPercent,
    Def,
    DefPercent,
    ElementalMastery,
    EnergyRecharge,
    CritRate,
    CritDamage,
    HealingBonus,
    PhysicalDamage,
    AnemoDamage,
    CryoDamage,
    DendroDamage,
    ElectroDamage,
    GeoDamage,
    HydroDamage,
    PyroDamage,
}

impl StatKey {
    /// Keys that may appear as artifact sub-stats.
    pub const SUBSTATS: [StatKey; 10] = [
        StatKey::Hp,
        StatKey::HpPercent,
        StatKey::Atk,
        StatKey::AtkPercent,
        StatKey::Def,
        StatKey::DefPercent,
        StatKey::ElementalMastery,
        StatKey::EnergyRecharge,
        StatKey::CritRate,
        StatKey::CritDamage,
    ];

    /// Returns true if this key can be rolled as a sub-stat.
    pub fn is_substat(self) -> bool {
        self.substat_index().is_some()
    }

    /// Position in [`StatKey::SUBSTATS`], for fixed-size sub-stat tables.
    pub fn substat_index(self) -> Option<usize> {
        Self::SUBSTATS.iter().position(|key| *key == self)
    }

    /// Flat HP/ATK/DEF. These are excluded from roll-fraction scoring.
    pub const fn is_flat_base(self) -> bool {
        matches!(self, StatKey::Hp | StatKey::Atk | StatKey::Def)
    }

    /// The damage-bonus key for an element.
    pub const fn damage_bonus(element: Element) -> Self {
        match element {
            Element::Physical => StatKey::PhysicalDamage,
            Element::Anemo => StatKey::AnemoDamage,
            Element::Cryo => StatKey::CryoDamage,
            Element::Dendro => StatKey::DendroDamage,
            Element::Electro => StatKey::ElectroDamage,
            Element::Geo => StatKey::GeoDamage,
            Element::Hydro => StatKey::HydroDamage,
            Element::Pyro => StatKey::PyroDamage,
        }
    }

    /// Iterates every key in canonical order.
    pub fn all() -> impl Iterator<Item = StatKey> {
        StatKey::iter()
    }
}

/// A derived, post-aggregation character stat.
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
pub enum OverallStatKey {
    Atk,
    CritDamage,
    CritRate,
    Def,
    MaxHp,
    EnergyRecharge,
    ElementalMastery,
    HealingBonus,
    PhysicalDamage,
    AnemoDamage,
    CryoDamage,
    DendroDamage,
    ElectroDamage,
    GeoDamage,
    HydroDamage,
    PyroDamage,
}

impl OverallStatKey {
    /// The sub-stat whose rolls count toward this derived stat when scoring.
    ///
    /// Only percent-type keys and elemental mastery qualify; flat HP/ATK/DEF
    /// sub-stats are never used, and derived stats with no sub-stat source
    /// (damage bonuses, healing) return `None`.
    pub const fn scoring_substat(self) -> Option<StatKey> {
        match self {
            OverallStatKey::Atk => Some(StatKey::AtkPercent),
            OverallStatKey::Def => Some(StatKey::DefPercent),
            OverallStatKey::MaxHp => Some(StatKey::HpPercent),
            OverallStatKey::CritRate => Some(StatKey::CritRate),
            OverallStatKey::CritDamage => Some(StatKey::CritDamage),
            OverallStatKey::EnergyRecharge => Some(StatKey::EnergyRecharge),
            OverallStatKey::ElementalMastery => Some(StatKey::ElementalMastery),
            _ => None,
        }
    }

    /// The derived damage-bonus key for an element.
    pub const fn damage_bonus(element: Element) -> Self {
        match element {
            Element::Physical => OverallStatKey::PhysicalDamage,
            Element::Anemo => OverallStatKey::AnemoDamage,
            Element::Cryo => OverallStatKey::CryoDamage,
            Element::Dendro => OverallStatKey::DendroDamage,
            Element::Electro => OverallStatKey::ElectroDamage,
            Element::Geo => OverallStatKey::GeoDamage,
            Element::Hydro => OverallStatKey::HydroDamage,
            Element::Pyro => OverallStatKey::PyroDamage,
        }
    }

    /// Iterates every derived key.
    pub fn all() -> impl Iterator<Item = OverallStatKey> {
        OverallStatKey::iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substats_are_in_canonical_order() {
        let mut sorted = StatKey::SUBSTATS;
        sorted.sort();
        assert_eq!(sorted, StatKey::SUBSTATS);
    }

    #[test]
    fn flat_substats_have_no_scoring_role() {
        for key in OverallStatKey::all() {
            if let Some(sub) = key.scoring_substat() {
                assert!(!sub.is_flat_base(), "{key} maps to flat {sub}");
                assert!(sub.is_substat());
            }
        }
    }

    #[test]
    fn keys_parse_case_insensitively() {
        assert_eq!("crit_rate".parse::<StatKey>().ok(), Some(StatKey::CritRate));
        assert_eq!("ATK_PERCENT".parse::<StatKey>().ok(), Some(StatKey::AtkPercent));
        assert_eq!(StatKey::PyroDamage.to_string(), "pyro_damage");
        assert_eq!(
            OverallStatKey::damage_bonus(Element::Hydro),
            OverallStatKey::HydroDamage
        );
    }
}
