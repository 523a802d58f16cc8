//! Weighted set-bonus factor.
//!
//! An artifact valued in isolation says nothing about the other four slots.
//! When a build wants set bonuses and the artifact belongs to none of them,
//! its value is discounted by how likely a random loadout around it could
//! still field the required pieces.

use std::collections::BTreeMap;

use crate::artifact::{Artifact, ArtifactSlot};
use crate::build::SetBonus;
use crate::env::OddsTables;
use crate::stats::StatKey;

/// Odds that a random artifact in `slot` carries an acceptable main stat,
/// normalised against the five slots.
fn slot_weight(
    slot: ArtifactSlot,
    main_stats: &BTreeMap<ArtifactSlot, Vec<StatKey>>,
    tables: &OddsTables,
) -> f64 {
    let odds = match main_stats.get(&slot) {
        Some(accepted) if !accepted.is_empty() => tables.main_stat_probability(slot, accepted),
        _ => 1.0,
    };
    odds / ArtifactSlot::COUNT as f64
}

/// Sum over every `size`-subset of `slots` (given as a bit mask) of the
/// product of the member weights.
fn subset_weight(weights: &[f64; ArtifactSlot::COUNT], slots: u32, size: usize) -> f64 {
    (0u32..1 << ArtifactSlot::COUNT)
        .filter(|subset| subset & !slots == 0 && subset.count_ones() as usize == size)
        .map(|subset| {
            ArtifactSlot::ALL
                .iter()
                .filter(|slot| subset & (1 << slot.index()) != 0)
                .map(|slot| weights[slot.index()])
                .product::<f64>()
        })
        .sum()
}

/// Discount in `[0, 1]` applied to an artifact's averaged metrics.
///
/// Returns exactly 1 when no set bonuses are desired or the artifact already
/// belongs to a desired set. Otherwise every required piece must come from the
/// other four slots: the result is the weight of those subsets over the weight
/// of all same-size subsets of the five slots, and 0 when more pieces are
/// required than four slots can hold.
pub fn weighted_set_bonus_factor(
    artifact: &Artifact,
    main_stats: &BTreeMap<ArtifactSlot, Vec<StatKey>>,
    set_bonuses: &[SetBonus],
    tables: &OddsTables,
) -> f64 {
    if set_bonuses.is_empty() || set_bonuses.iter().any(|bonus| bonus.set == artifact.set) {
        return 1.0;
    }

    let needed: usize = set_bonuses.iter().map(|bonus| bonus.tier.pieces()).sum();
    if needed >= ArtifactSlot::COUNT {
        return 0.0;
    }

    let weights = ArtifactSlot::ALL.map(|slot| slot_weight(slot, main_stats, tables));
    let all_slots = (1u32 << ArtifactSlot::COUNT) - 1;
    let other_slots = all_slots & !(1 << artifact.slot.index());

    let artifact_weight = subset_weight(&weights, other_slots, needed);
    let total_weight = subset_weight(&weights, all_slots, needed);
    if total_weight <= 0.0 {
        return 0.0;
    }
    (artifact_weight / total_weight).clamp(0.0, 1.0)
}
