//! Odds tables: every probability and value the roll simulator draws from.
//!
//! Tables arrive as an [`OddsTableSpec`] (the serializable, map-shaped form
//! loaded from data files) and are validated into [`OddsTables`], which keeps
//! fixed-size arrays indexed by slot, rarity and sub-stat. Once constructed, a
//! table has an entry for every key the simulator can ask about.

use std::collections::BTreeMap;

use super::TableError;
use crate::artifact::{ArtifactSlot, MAX_SUBSTATS, Rarity};
use crate::stats::StatKey;

const SUBSTAT_COUNT: usize = StatKey::SUBSTATS.len();
const RARITY_COUNT: usize = Rarity::ALL.len();

/// Probability tables must sum to 1.0 within this tolerance.
pub const SUM_TOLERANCE: f64 = 1e-6;

/// Serializable form of the odds tables, as written in data files.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OddsTableSpec {
    /// Legal main stats per slot with their drop probabilities.
    pub main_stat_odds: BTreeMap<ArtifactSlot, Vec<(StatKey, f64)>>,
    /// Relative weight of each sub-stat when a new key is drawn.
    pub substat_weights: BTreeMap<StatKey, f64>,
    pub rarities: BTreeMap<Rarity, RarityTableSpec>,
}

/// Per-rarity entries of [`OddsTableSpec`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RarityTableSpec {
    pub max_level: u8,
    pub substat_cap: usize,
    /// Probability of each initial sub-stat count on a fresh drop.
    pub initial_substat_odds: Vec<(usize, f64)>,
    /// Discrete roll values per sub-stat, lowest first.
    pub roll_values: BTreeMap<StatKey, Vec<f64>>,
    /// Main-stat value at max level.
    pub main_stat_max: BTreeMap<StatKey, f64>,
}

#[derive(Clone, Debug, PartialEq)]
struct RarityOdds {
    max_level: u8,
    substat_cap: usize,
    initial_substat_odds: Vec<(usize, f64)>,
    roll_values: [Vec<f64>; SUBSTAT_COUNT],
    main_stat_max: [Option<f64>; <StatKey as strum::EnumCount>::COUNT],
}

/// Validated odds tables.
#[derive(Clone, Debug, PartialEq)]
pub struct OddsTables {
    main_stat_odds: [Vec<(StatKey, f64)>; ArtifactSlot::COUNT],
    substat_weights: [f64; SUBSTAT_COUNT],
    rarities: [RarityOdds; RARITY_COUNT],
}

impl OddsTables {
    /// Validates a table spec.
    ///
    /// # Errors
    ///
    /// Returns the first missing entry, invalid weight, or probability table
    /// that does not sum to one.
    pub fn new(spec: OddsTableSpec) -> Result<Self, TableError> {
        validate(&spec)?;
        Ok(Self::from_validated(&spec))
    }

    /// Tables reflecting the published drop rates and roll values.
    pub fn standard() -> Self {
        Self::from_validated(&super::standard::standard_spec())
    }

    fn from_validated(spec: &OddsTableSpec) -> Self {
        let main_stat_odds = std::array::from_fn(|index| {
            spec.main_stat_odds
                .get(&ArtifactSlot::ALL[index])
                .cloned()
                .unwrap_or_default()
        });
        let substat_weights = std::array::from_fn(|index| {
            spec.substat_weights
                .get(&StatKey::SUBSTATS[index])
                .copied()
                .unwrap_or_default()
        });
        let rarities = std::array::from_fn(|index| {
            let rarity = spec
                .rarities
                .get(&Rarity::ALL[index])
                .cloned()
                .unwrap_or_default();
            let mut main_stat_max = [None; <StatKey as strum::EnumCount>::COUNT];
            for (key, value) in &rarity.main_stat_max {
                main_stat_max[*key as usize] = Some(*value);
            }
            RarityOdds {
                max_level: rarity.max_level,
                substat_cap: rarity.substat_cap,
                initial_substat_odds: rarity.initial_substat_odds,
                roll_values: std::array::from_fn(|sub| {
                    rarity
                        .roll_values
                        .get(&StatKey::SUBSTATS[sub])
                        .cloned()
                        .unwrap_or_default()
                }),
                main_stat_max,
            }
        });
        Self {
            main_stat_odds,
            substat_weights,
            rarities,
        }
    }

    /// Converts back into the serializable map form.
    pub fn to_spec(&self) -> OddsTableSpec {
        let main_stat_odds = ArtifactSlot::ALL
            .iter()
            .map(|slot| (*slot, self.main_stat_odds[slot.index()].clone()))
            .collect();
        let substat_weights = StatKey::SUBSTATS
            .iter()
            .zip(self.substat_weights)
            .map(|(key, weight)| (*key, weight))
            .collect();
        let rarities = Rarity::ALL
            .iter()
            .map(|rarity| {
                let odds = &self.rarities[rarity.index()];
                let spec = RarityTableSpec {
                    max_level: odds.max_level,
                    substat_cap: odds.substat_cap,
                    initial_substat_odds: odds.initial_substat_odds.clone(),
                    roll_values: StatKey::SUBSTATS
                        .iter()
                        .zip(&odds.roll_values)
                        .filter(|(_, values)| !values.is_empty())
                        .map(|(key, values)| (*key, values.clone()))
                        .collect(),
                    main_stat_max: StatKey::all()
                        .filter_map(|key| odds.main_stat_max[key as usize].map(|v| (key, v)))
                        .collect(),
                };
                (*rarity, spec)
            })
            .collect();
        OddsTableSpec {
            main_stat_odds,
            substat_weights,
            rarities,
        }
    }

    pub fn max_level(&self, rarity: Rarity) -> u8 {
        self.rarities[rarity.index()].max_level
    }

    /// Maximum number of sub-stats an artifact of this rarity can carry.
    pub fn substat_cap(&self, rarity: Rarity) -> usize {
        self.rarities[rarity.index()].substat_cap
    }

    /// Legal main stats of a slot with their drop probabilities.
    pub fn main_stat_odds(&self, slot: ArtifactSlot) -> &[(StatKey, f64)] {
        &self.main_stat_odds[slot.index()]
    }

    pub fn is_legal_main_stat(&self, slot: ArtifactSlot, key: StatKey) -> bool {
        self.main_stat_odds(slot).iter().any(|(k, _)| *k == key)
    }

    /// Sum of the slot's main-stat odds restricted to `keys`.
    pub fn main_stat_probability(&self, slot: ArtifactSlot, keys: &[StatKey]) -> f64 {
        self.main_stat_odds(slot)
            .iter()
            .filter(|(key, _)| keys.contains(key))
            .map(|(_, odds)| odds)
            .sum()
    }

    /// Relative selection weight of a sub-stat; zero for keys that cannot roll.
    pub fn substat_weight(&self, key: StatKey) -> f64 {
        key.substat_index()
            .map_or(0.0, |index| self.substat_weights[index])
    }

    pub fn initial_substat_odds(&self, rarity: Rarity) -> &[(usize, f64)] {
        &self.rarities[rarity.index()].initial_substat_odds
    }

    /// Discrete roll values of a sub-stat; empty for keys that cannot roll.
    pub fn roll_values(&self, rarity: Rarity, key: StatKey) -> &[f64] {
        key.substat_index().map_or(&[][..], |index| {
            self.rarities[rarity.index()].roll_values[index].as_slice()
        })
    }

    /// Largest single roll of a sub-stat.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::MissingRollValues`] when the stat has no roll table
    /// at this rarity.
    pub fn max_roll(&self, rarity: Rarity, key: StatKey) -> Result<f64, TableError> {
        self.roll_values(rarity, key)
            .iter()
            .copied()
            .reduce(f64::max)
            .ok_or(TableError::MissingRollValues {
                rarity: rarity.stars(),
                key,
            })
    }

    /// Main-stat value at max level.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::MissingMainStatMax`] for a key no slot can carry.
    pub fn main_stat_max(&self, rarity: Rarity, key: StatKey) -> Result<f64, TableError> {
        self.rarities[rarity.index()].main_stat_max[key as usize].ok_or(
            TableError::MissingMainStatMax {
                rarity: rarity.stars(),
                key,
            },
        )
    }
}

impl Default for OddsTables {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<OddsTableSpec> for OddsTables {
    type Error = TableError;

    fn try_from(spec: OddsTableSpec) -> Result<Self, Self::Error> {
        Self::new(spec)
    }
}

fn check_weight(table: &'static str, weight: f64) -> Result<(), TableError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(TableError::InvalidWeight { table, weight })
    }
}

fn check_probabilities<'a>(
    table: &'static str,
    odds: impl IntoIterator<Item = &'a f64>,
) -> Result<(), TableError> {
    let mut sum = 0.0;
    for weight in odds {
        check_weight(table, *weight)?;
        sum += weight;
    }
    if (sum - 1.0).abs() > SUM_TOLERANCE {
        return Err(TableError::OddsSum { table, sum });
    }
    Ok(())
}

fn validate(spec: &OddsTableSpec) -> Result<(), TableError> {
    for slot in ArtifactSlot::ALL {
        let odds = spec
            .main_stat_odds
            .get(&slot)
            .filter(|odds| !odds.is_empty())
            .ok_or(TableError::MissingMainStatOdds(slot))?;
        check_probabilities("main_stat_odds", odds.iter().map(|(_, p)| p))?;
    }

    for key in spec.substat_weights.keys() {
        if !key.is_substat() {
            return Err(TableError::NotASubstat(*key));
        }
    }
    for key in StatKey::SUBSTATS {
        let weight = spec
            .substat_weights
            .get(&key)
            .ok_or(TableError::MissingSubstatWeight(key))?;
        check_weight("substat_weights", *weight)?;
    }

    for rarity in Rarity::ALL {
        let stars = rarity.stars();
        let table = spec
            .rarities
            .get(&rarity)
            .ok_or(TableError::MissingRarity(stars))?;

        if table.substat_cap > MAX_SUBSTATS {
            return Err(TableError::SubstatCount {
                rarity: stars,
                count: table.substat_cap,
            });
        }
        if let Some((count, _)) = table
            .initial_substat_odds
            .iter()
            .find(|(count, _)| *count > table.substat_cap)
        {
            return Err(TableError::SubstatCount {
                rarity: stars,
                count: *count,
            });
        }
        check_probabilities(
            "initial_substat_odds",
            table.initial_substat_odds.iter().map(|(_, p)| p),
        )?;

        for key in table.roll_values.keys() {
            if !key.is_substat() {
                return Err(TableError::NotASubstat(*key));
            }
        }
        if table.substat_cap > 0 {
            for key in StatKey::SUBSTATS {
                let values = table
                    .roll_values
                    .get(&key)
                    .filter(|values| !values.is_empty())
                    .ok_or(TableError::MissingRollValues { rarity: stars, key })?;
                for value in values {
                    check_weight("roll_values", *value)?;
                }
            }
        }

        for odds in spec.main_stat_odds.values() {
            for (key, _) in odds {
                if !table.main_stat_max.contains_key(key) {
                    return Err(TableError::MissingMainStatMax { rarity: stars, key: *key });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_tables_pass_validation() {
        let spec = OddsTables::standard().to_spec();
        let tables = OddsTables::new(spec).expect("standard tables are complete");
        assert_eq!(tables, OddsTables::standard());
    }

    #[test]
    fn standard_lookups() {
        let tables = OddsTables::standard();
        assert_eq!(tables.max_level(Rarity::FIVE), 20);
        assert_eq!(tables.max_level(Rarity::THREE), 12);
        assert_eq!(tables.substat_cap(Rarity::ONE), 0);
        assert_eq!(tables.substat_cap(Rarity::FOUR), 4);
        assert_eq!(tables.max_roll(Rarity::FIVE, StatKey::CritRate), Ok(3.89));
        assert_eq!(tables.main_stat_max(Rarity::FIVE, StatKey::Atk), Ok(311.0));
        assert!(tables.is_legal_main_stat(ArtifactSlot::Goblet, StatKey::PyroDamage));
        assert!(!tables.is_legal_main_stat(ArtifactSlot::Sands, StatKey::CritRate));
        assert!(tables.roll_values(Rarity::FIVE, StatKey::HealingBonus).is_empty());
        assert_eq!(tables.substat_weight(StatKey::PyroDamage), 0.0);
    }

    #[test]
    fn main_stat_probability_sums_selected_keys() {
        let tables = OddsTables::standard();
        let p = tables.main_stat_probability(
            ArtifactSlot::Circlet,
            &[StatKey::CritRate, StatKey::CritDamage],
        );
        assert!((p - 0.2).abs() < 1e-9);
        assert_eq!(tables.main_stat_probability(ArtifactSlot::Flower, &[]), 0.0);
    }

    #[test]
    fn missing_slot_is_rejected() {
        let mut spec = OddsTables::standard().to_spec();
        spec.main_stat_odds.remove(&ArtifactSlot::Goblet);
        assert_eq!(
            OddsTables::new(spec),
            Err(TableError::MissingMainStatOdds(ArtifactSlot::Goblet))
        );
    }

    #[test]
    fn odds_short_of_one_are_rejected() {
        let mut spec = OddsTables::standard().to_spec();
        spec.main_stat_odds
            .insert(ArtifactSlot::Sands, vec![(StatKey::AtkPercent, 0.5)]);
        assert!(matches!(
            OddsTables::new(spec),
            Err(TableError::OddsSum { table: "main_stat_odds", .. })
        ));
    }

    #[test]
    fn missing_roll_values_are_rejected() {
        let mut spec = OddsTables::standard().to_spec();
        if let Some(five) = spec.rarities.get_mut(&Rarity::FIVE) {
            five.roll_values.remove(&StatKey::CritDamage);
        }
        assert_eq!(
            OddsTables::new(spec),
            Err(TableError::MissingRollValues {
                rarity: 5,
                key: StatKey::CritDamage,
            })
        );
    }

    #[test]
    fn missing_main_stat_max_is_rejected() {
        let mut spec = OddsTables::standard().to_spec();
        if let Some(four) = spec.rarities.get_mut(&Rarity::FOUR) {
            four.main_stat_max.remove(&StatKey::HealingBonus);
        }
        assert_eq!(
            OddsTables::new(spec),
            Err(TableError::MissingMainStatMax {
                rarity: 4,
                key: StatKey::HealingBonus,
            })
        );
    }

    #[test]
    fn initial_count_above_cap_is_rejected() {
        let mut spec = OddsTables::standard().to_spec();
        if let Some(two) = spec.rarities.get_mut(&Rarity::TWO) {
            two.initial_substat_odds = vec![(3, 1.0)];
        }
        assert_eq!(
            OddsTables::new(spec),
            Err(TableError::SubstatCount { rarity: 2, count: 3 })
        );
    }
}
