//! Character and weapon reference data.

use std::collections::HashMap;

use super::CatalogError;
use crate::ids::{CharacterId, WeaponId};
use crate::stats::StatKey;

/// Max-level base attack, defense and HP.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BaseStats {
    pub hp: f64,
    pub atk: f64,
    pub def: f64,
}

impl BaseStats {
    pub const fn new(hp: f64, atk: f64, def: f64) -> Self {
        Self { hp, atk, def }
    }
}

/// A single (key, value) bonus such as an ascension stat or weapon secondary.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatBonus {
    pub key: StatKey,
    pub value: f64,
}

impl StatBonus {
    pub const fn new(key: StatKey, value: f64) -> Self {
        Self { key, value }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Character {
    pub id: CharacterId,
    pub base: BaseStats,
    pub ascension: StatBonus,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Weapon {
    pub id: WeaponId,
    /// Weapons usually only carry base attack; the other fields default to zero.
    pub base: BaseStats,
    #[cfg_attr(feature = "serde", serde(default))]
    pub main_stat: Option<StatBonus>,
}

/// Read-only lookup of characters and weapons by id.
pub trait CatalogOracle: Send + Sync {
    fn character(&self, id: &CharacterId) -> Option<Character>;
    fn weapon(&self, id: &WeaponId) -> Option<Weapon>;

    fn require_character(&self, id: &CharacterId) -> Result<Character, CatalogError> {
        self.character(id)
            .ok_or_else(|| CatalogError::CharacterNotFound(id.clone()))
    }

    fn require_weapon(&self, id: &WeaponId) -> Result<Weapon, CatalogError> {
        self.weapon(id)
            .ok_or_else(|| CatalogError::WeaponNotFound(id.clone()))
    }
}

/// In-memory catalog.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    characters: HashMap<CharacterId, Character>,
    weapons: HashMap<WeaponId, Weapon>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        characters: impl IntoIterator<Item = Character>,
        weapons: impl IntoIterator<Item = Weapon>,
    ) -> Self {
        Self {
            characters: characters.into_iter().map(|c| (c.id.clone(), c)).collect(),
            weapons: weapons.into_iter().map(|w| (w.id.clone(), w)).collect(),
        }
    }

    pub fn insert_character(&mut self, character: Character) {
        self.characters.insert(character.id.clone(), character);
    }

    pub fn insert_weapon(&mut self, weapon: Weapon) {
        self.weapons.insert(weapon.id.clone(), weapon);
    }

    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    pub fn weapon_count(&self) -> usize {
        self.weapons.len()
    }
}

impl CatalogOracle for Catalog {
    fn character(&self, id: &CharacterId) -> Option<Character> {
        self.characters.get(id).cloned()
    }

    fn weapon(&self, id: &WeaponId) -> Option<Weapon> {
        self.weapons.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_reports_missing_ids() {
        let catalog = Catalog::from_parts(
            [Character {
                id: CharacterId::new("diluc"),
                base: BaseStats::new(12981.0, 335.0, 784.0),
                ascension: StatBonus::new(StatKey::CritRate, 19.2),
            }],
            [],
        );

        assert!(catalog.require_character(&CharacterId::new("diluc")).is_ok());
        assert_eq!(
            catalog.require_weapon(&WeaponId::new("wolfs_gravestone")),
            Err(CatalogError::WeaponNotFound(WeaponId::new("wolfs_gravestone")))
        );
    }
}
