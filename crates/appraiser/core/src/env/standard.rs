//! Built-in odds tables matching the published drop rates.

use std::collections::BTreeMap;

use super::tables::{OddsTableSpec, RarityTableSpec};
use crate::artifact::{ArtifactSlot, Rarity};
use crate::stats::StatKey::{self, *};

const ELEMENTAL: [StatKey; 7] = [
    AnemoDamage,
    CryoDamage,
    DendroDamage,
    ElectroDamage,
    GeoDamage,
    HydroDamage,
    PyroDamage,
];

fn main_stat_odds() -> BTreeMap<ArtifactSlot, Vec<(StatKey, f64)>> {
    let mut goblet = vec![
        (HpPercent, 0.1925),
        (AtkPercent, 0.1925),
        (DefPercent, 0.19),
        (PhysicalDamage, 0.05),
    ];
    goblet.extend(ELEMENTAL.iter().map(|key| (*key, 0.05)));
    goblet.push((ElementalMastery, 0.025));

    BTreeMap::from([
        (ArtifactSlot::Flower, vec![(Hp, 1.0)]),
        (ArtifactSlot::Plume, vec![(Atk, 1.0)]),
        (
            ArtifactSlot::Sands,
            vec![
                (HpPercent, 0.2668),
                (AtkPercent, 0.2666),
                (DefPercent, 0.2666),
                (EnergyRecharge, 0.1),
                (ElementalMastery, 0.1),
            ],
        ),
        (ArtifactSlot::Goblet, goblet),
        (
            ArtifactSlot::Circlet,
            vec![
                (HpPercent, 0.22),
                (AtkPercent, 0.22),
                (DefPercent, 0.22),
                (CritRate, 0.1),
                (CritDamage, 0.1),
                (HealingBonus, 0.1),
                (ElementalMastery, 0.04),
            ],
        ),
    ])
}

fn substat_weights() -> BTreeMap<StatKey, f64> {
    BTreeMap::from([
        (Hp, 6.0),
        (Atk, 6.0),
        (Def, 6.0),
        (HpPercent, 4.0),
        (AtkPercent, 4.0),
        (DefPercent, 4.0),
        (EnergyRecharge, 4.0),
        (ElementalMastery, 4.0),
        (CritRate, 3.0),
        (CritDamage, 3.0),
    ])
}

/// Main-stat maxima in the order
/// `[hp, atk, hp%/atk%/elemental, def%/physical, em, er, cr, cd, healing]`.
fn main_stat_max(values: [f64; 9]) -> BTreeMap<StatKey, f64> {
    let [hp, atk, percent, def_percent, em, er, cr, cd, healing] = values;
    let mut max = BTreeMap::from([
        (Hp, hp),
        (Atk, atk),
        (HpPercent, percent),
        (AtkPercent, percent),
        (DefPercent, def_percent),
        (PhysicalDamage, def_percent),
        (ElementalMastery, em),
        (EnergyRecharge, er),
        (CritRate, cr),
        (CritDamage, cd),
        (HealingBonus, healing),
    ]);
    max.extend(ELEMENTAL.iter().map(|key| (*key, percent)));
    max
}

/// Roll values in [`StatKey::SUBSTATS`] order.
fn roll_values(rows: [&[f64]; 10]) -> BTreeMap<StatKey, Vec<f64>> {
    StatKey::SUBSTATS
        .iter()
        .zip(rows)
        .map(|(key, row)| (*key, row.to_vec()))
        .collect()
}

fn rarity_tables() -> BTreeMap<Rarity, RarityTableSpec> {
    let one = RarityTableSpec {
        max_level: 4,
        substat_cap: 0,
        initial_substat_odds: vec![(0, 1.0)],
        roll_values: roll_values([
            &[23.9, 29.88],
            &[1.17, 1.46],
            &[1.56, 1.95],
            &[1.17, 1.46],
            &[1.85, 2.31],
            &[1.46, 1.82],
            &[4.66, 5.83],
            &[1.3, 1.62],
            &[0.78, 0.97],
            &[1.55, 1.94],
        ]),
        main_stat_max: main_stat_max([430.0, 28.0, 5.2, 6.6, 21.0, 5.8, 3.5, 7.0, 4.0]),
    };
    let two = RarityTableSpec {
        max_level: 4,
        substat_cap: 2,
        initial_substat_odds: vec![(0, 0.8), (1, 0.2)],
        roll_values: roll_values([
            &[50.19, 57.36, 64.53, 71.7],
            &[1.63, 1.86, 2.1, 2.33],
            &[3.27, 3.74, 4.2, 4.67],
            &[1.63, 1.86, 2.1, 2.33],
            &[3.89, 4.44, 5.0, 5.56],
            &[2.04, 2.33, 2.62, 2.91],
            &[6.53, 7.46, 8.39, 9.33],
            &[1.81, 2.07, 2.33, 2.59],
            &[1.09, 1.24, 1.4, 1.55],
            &[2.18, 2.49, 2.8, 3.11],
        ]),
        main_stat_max: main_stat_max([717.0, 47.0, 8.4, 10.5, 33.6, 9.3, 5.6, 11.2, 6.5]),
    };
    let three = RarityTableSpec {
        max_level: 12,
        substat_cap: 4,
        initial_substat_odds: vec![(1, 0.8), (2, 0.2)],
        roll_values: roll_values([
            &[100.38, 114.72, 129.06, 143.4],
            &[2.45, 2.8, 3.15, 3.5],
            &[6.54, 7.47, 8.4, 9.34],
            &[2.45, 2.8, 3.15, 3.5],
            &[7.78, 8.89, 10.0, 11.11],
            &[3.06, 3.5, 3.93, 4.37],
            &[9.79, 11.19, 12.59, 13.99],
            &[2.72, 3.11, 3.5, 3.89],
            &[1.63, 1.86, 2.1, 2.33],
            &[3.26, 3.73, 4.2, 4.66],
        ]),
        main_stat_max: main_stat_max([1893.0, 123.0, 23.1, 28.8, 92.3, 25.6, 15.4, 30.8, 17.8]),
    };
    let four = RarityTableSpec {
        max_level: 16,
        substat_cap: 4,
        initial_substat_odds: vec![(2, 0.8), (3, 0.2)],
        roll_values: roll_values([
            &[167.3, 191.2, 215.1, 239.0],
            &[3.26, 3.73, 4.2, 4.66],
            &[10.89, 12.45, 14.0, 15.56],
            &[3.26, 3.73, 4.2, 4.66],
            &[12.96, 14.82, 16.67, 18.52],
            &[4.08, 4.66, 5.25, 5.83],
            &[13.06, 14.92, 16.79, 18.65],
            &[3.63, 4.14, 4.66, 5.18],
            &[2.18, 2.49, 2.8, 3.11],
            &[4.35, 4.97, 5.6, 6.22],
        ]),
        main_stat_max: main_stat_max([3571.0, 232.0, 34.8, 43.5, 139.3, 38.7, 23.2, 46.4, 26.8]),
    };
    let five = RarityTableSpec {
        max_level: 20,
        substat_cap: 4,
        initial_substat_odds: vec![(3, 0.8), (4, 0.2)],
        roll_values: roll_values([
            &[209.13, 239.0, 268.88, 298.75],
            &[4.08, 4.66, 5.25, 5.83],
            &[13.62, 15.56, 17.51, 19.45],
            &[4.08, 4.66, 5.25, 5.83],
            &[16.2, 18.52, 20.83, 23.15],
            &[5.1, 5.83, 6.56, 7.29],
            &[16.32, 18.65, 20.98, 23.31],
            &[4.53, 5.18, 5.83, 6.48],
            &[2.72, 3.11, 3.5, 3.89],
            &[5.44, 6.22, 6.99, 7.77],
        ]),
        main_stat_max: main_stat_max([4780.0, 311.0, 46.6, 58.3, 186.5, 51.8, 31.1, 62.2, 35.9]),
    };

    BTreeMap::from([
        (Rarity::ONE, one),
        (Rarity::TWO, two),
        (Rarity::THREE, three),
        (Rarity::FOUR, four),
        (Rarity::FIVE, five),
    ])
}

pub(super) fn standard_spec() -> OddsTableSpec {
    OddsTableSpec {
        main_stat_odds: main_stat_odds(),
        substat_weights: substat_weights(),
        rarities: rarity_tables(),
    }
}
