//! Artifact upgrade simulation.
//!
//! Every [`LEVELS_PER_ROLL`] levels an artifact gains one sub-stat roll. While
//! the artifact is below its rarity's sub-stat cap a roll adds a new key, drawn
//! by weight from the keys it does not yet carry; once full, a roll picks an
//! existing sub-stat uniformly and adds a value from its roll table.

use rand::Rng;
use rand::seq::SliceRandom;

use super::draw::{weighted_choice, weighted_choice_relative};
use super::{Artifact, ArtifactError, ArtifactSlot, LEVELS_PER_ROLL, Rarity, RollError, SubStat};
use crate::env::{OddsTables, TableError};
use crate::ids::{ArtifactId, SetId};
use crate::stats::StatKey;

/// Rolls remaining between `level` and the rarity's max level.
///
/// Rarities with a sub-stat cap of zero never roll.
pub fn num_rolls(tables: &OddsTables, rarity: Rarity, level: u8) -> u32 {
    if tables.substat_cap(rarity) == 0 {
        return 0;
    }
    let remaining = tables.max_level(rarity).saturating_sub(level);
    u32::from(remaining.div_ceil(LEVELS_PER_ROLL))
}

fn draw_roll_value<R>(
    tables: &OddsTables,
    rarity: Rarity,
    key: StatKey,
    rng: &mut R,
) -> Result<f64, TableError>
where
    R: Rng + ?Sized,
{
    tables
        .roll_values(rarity, key)
        .choose(rng)
        .copied()
        .ok_or(TableError::MissingRollValues {
            rarity: rarity.stars(),
            key,
        })
}

/// Draws a sub-stat key the artifact does not carry yet.
fn draw_new_key<R>(artifact: &Artifact, tables: &OddsTables, rng: &mut R) -> Result<StatKey, TableError>
where
    R: Rng + ?Sized,
{
    let candidates: Vec<(StatKey, f64)> = StatKey::SUBSTATS
        .iter()
        .filter(|key| **key != artifact.main_stat && !artifact.has_substat(**key))
        .map(|key| (*key, tables.substat_weight(*key)))
        .collect();
    weighted_choice_relative(&candidates, "substat_weights", rng)
}

/// Returns a copy of `artifact` upgraded to its rarity's max level.
///
/// The input is never modified. New keys are inserted in canonical order;
/// upgrades to existing keys keep their positions.
///
/// # Errors
///
/// Fails with a [`TableError`] when a weighted draw exhausts its table or a
/// sub-stat has no roll values.
pub fn roll_to_max<R>(artifact: &Artifact, tables: &OddsTables, rng: &mut R) -> Result<Artifact, TableError>
where
    R: Rng + ?Sized,
{
    let mut rolled = artifact.clone();
    let cap = tables.substat_cap(artifact.rarity);

    for _ in 0..num_rolls(tables, artifact.rarity, artifact.level) {
        if rolled.substats.len() < cap && !rolled.substats.is_full() {
            let key = draw_new_key(&rolled, tables, rng)?;
            let value = draw_roll_value(tables, rolled.rarity, key, rng)?;
            rolled.substats.push(SubStat::new(key, value));
            rolled.sort_substats();
        } else if !rolled.substats.is_empty() {
            let index = rng.gen_range(0..rolled.substats.len());
            let key = rolled.substats[index].key;
            rolled.substats[index].value += draw_roll_value(tables, rolled.rarity, key, rng)?;
        }
    }

    rolled.level = tables.max_level(artifact.rarity).max(artifact.level);
    Ok(rolled)
}

/// Generates a new artifact and upgrades it to max level.
///
/// The main stat is drawn from the slot's odds unless supplied. The initial
/// sub-stat count comes from the rarity's count odds, and each initial
/// sub-stat holds the first entry of its roll table (a single low roll).
///
/// # Errors
///
/// Returns [`ArtifactError::IllegalMainStat`] when a supplied main stat is not
/// legal for the slot, and a [`TableError`] on a broken table.
pub fn roll_fresh<R>(
    id: ArtifactId,
    slot: ArtifactSlot,
    rarity: Rarity,
    set: SetId,
    main_stat: Option<StatKey>,
    tables: &OddsTables,
    rng: &mut R,
) -> Result<Artifact, RollError>
where
    R: Rng + ?Sized,
{
    let main_stat = match main_stat {
        Some(key) if tables.is_legal_main_stat(slot, key) => key,
        Some(key) => return Err(ArtifactError::IllegalMainStat { slot, key }.into()),
        None => weighted_choice(tables.main_stat_odds(slot), 1.0, "main_stat_odds", rng)?,
    };

    let mut artifact = Artifact::new(id, slot, rarity, main_stat, set);
    let count = weighted_choice(
        tables.initial_substat_odds(rarity),
        1.0,
        "initial_substat_odds",
        rng,
    )?
    .min(tables.substat_cap(rarity));

    for _ in 0..count {
        let key = draw_new_key(&artifact, tables, rng)?;
        let first = tables
            .roll_values(rarity, key)
            .first()
            .copied()
            .ok_or(TableError::MissingRollValues {
                rarity: rarity.stars(),
                key,
            })?;
        artifact = artifact.with_substat(key, first)?;
    }

    Ok(roll_to_max(&artifact, tables, rng)?)
}
