//! Character and weapon catalog loaders.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, bail};
use appraiser_core::{Catalog, Character, Weapon};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Character catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterCatalog {
    pub characters: Vec<Character>,
}

/// Weapon catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponCatalog {
    pub weapons: Vec<Weapon>,
}

/// Loader for the character/weapon catalog from RON files.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load characters from a RON file, rejecting duplicate ids.
    pub fn load_characters(path: &Path) -> LoadResult<Vec<Character>> {
        let content = read_file(path)?;
        let catalog: CharacterCatalog = ron::from_str(&content)
            .with_context(|| format!("Failed to parse character catalog RON {}", path.display()))?;

        let mut seen = HashSet::new();
        for character in &catalog.characters {
            if !seen.insert(&character.id) {
                bail!("Duplicate character '{}' in {}", character.id, path.display());
            }
        }
        Ok(catalog.characters)
    }

    /// Load weapons from a RON file, rejecting duplicate ids.
    pub fn load_weapons(path: &Path) -> LoadResult<Vec<Weapon>> {
        let content = read_file(path)?;
        let catalog: WeaponCatalog = ron::from_str(&content)
            .with_context(|| format!("Failed to parse weapon catalog RON {}", path.display()))?;

        let mut seen = HashSet::new();
        for weapon in &catalog.weapons {
            if !seen.insert(&weapon.id) {
                bail!("Duplicate weapon '{}' in {}", weapon.id, path.display());
            }
        }
        Ok(catalog.weapons)
    }

    /// Load both files into an in-memory [`Catalog`].
    pub fn load(characters: &Path, weapons: &Path) -> LoadResult<Catalog> {
        let catalog = Catalog::from_parts(Self::load_characters(characters)?, Self::load_weapons(weapons)?);
        tracing::debug!(
            target: "content::catalog",
            characters = catalog.character_count(),
            weapons = catalog.weapon_count(),
            "loaded catalog"
        );
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appraiser_core::{CatalogOracle, CharacterId, StatKey, WeaponId};

    const CHARACTERS: &str = r#"(
        characters: [
            (
                id: "xiangling",
                base: (hp: 10875.0, atk: 225.0, def: 669.0),
                ascension: (key: elemental_mastery, value: 96.0),
            ),
        ],
    )"#;

    const WEAPONS: &str = r#"(
        weapons: [
            (
                id: "the_catch",
                base: (atk: 510.0),
                main_stat: Some((key: energy_recharge, value: 45.9)),
            ),
            (id: "white_tassel", base: (atk: 401.0)),
        ],
    )"#;

    #[test]
    fn loads_catalog_from_ron() {
        let dir = tempfile::tempdir().expect("temp dir");
        let characters = dir.path().join("characters.ron");
        let weapons = dir.path().join("weapons.ron");
        std::fs::write(&characters, CHARACTERS).expect("write characters");
        std::fs::write(&weapons, WEAPONS).expect("write weapons");

        let catalog = CatalogLoader::load(&characters, &weapons).expect("load catalog");
        let xiangling = catalog
            .character(&CharacterId::new("xiangling"))
            .expect("xiangling present");
        assert_eq!(xiangling.ascension.key, StatKey::ElementalMastery);

        let tassel = catalog
            .weapon(&WeaponId::new("white_tassel"))
            .expect("white tassel present");
        assert_eq!(tassel.main_stat, None);
        assert_eq!(tassel.base.hp, 0.0);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let weapons = dir.path().join("weapons.ron");
        std::fs::write(
            &weapons,
            r#"(weapons: [(id: "dup", base: (atk: 1.0)), (id: "dup", base: (atk: 2.0))])"#,
        )
        .expect("write weapons");

        let err = CatalogLoader::load_weapons(&weapons).expect_err("duplicate id");
        assert!(err.to_string().contains("Duplicate weapon 'dup'"));
    }
}
