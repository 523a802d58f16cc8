//! Monte Carlo valuation of an artifact against a build.
//!
//! Each trial upgrades the candidate (and the artifact currently equipped in
//! its slot) to max level and scores both. Averages over the trials, scaled by
//! the [weighted set-bonus factor](weighted_set_bonus_factor), give:
//!
//! - `rating`: expected score of the candidate
//! - `plus_minus`: expected improvement over the equipped artifact
//! - `positive_plus_minus_odds`: fraction of trials where the candidate wins
//! - `satisfaction_odds`: fraction of trials where the build's loadout with
//!   the candidate swapped in meets every declared requirement
//!
//! Trials are summed into [`TrialTotals`], which add associatively, so a
//! caller may split the iterations across threads and combine the partial
//! totals before [`Valuator::finish`].

mod error;
mod set_bonus;

pub use error::ValuationError;
pub use set_bonus::weighted_set_bonus_factor;

use std::ops::{Add, AddAssign};

use rand::Rng;

use crate::artifact::{Artifact, ArtifactSet, roll_to_max};
use crate::build::Build;
use crate::config::{PriorityWeights, ValuationConfig};
use crate::env::{CatalogOracle, Character, OddsTables, TableError, Weapon};
use crate::evaluate::{EvaluateOptions, evaluate};

/// Scores a (typically fully rolled) artifact for a build.
///
/// Sums, over the build's desired stats, the priority weight times the
/// matching sub-stat value divided by that stat's largest single roll. Only
/// percent-type stats and elemental mastery count; flat HP/ATK/DEF never do.
/// An artifact whose main stat the build rejects for its slot scores 0.
///
/// # Errors
///
/// Fails when a carried scoring sub-stat has no roll table at the artifact's
/// rarity.
pub fn score_artifact(
    artifact: &Artifact,
    build: &Build,
    tables: &OddsTables,
    weights: &PriorityWeights,
) -> Result<f64, TableError> {
    if !build.accepts_main_stat(artifact.slot, artifact.main_stat) {
        return Ok(0.0);
    }
    let mut score = 0.0;
    for desired in &build.desired_stats {
        let Some(key) = desired.key.scoring_substat() else {
            continue;
        };
        let Some(value) = artifact.substat(key) else {
            continue;
        };
        score += weights.weight(desired.priority) * value / tables.max_roll(artifact.rarity, key)?;
    }
    Ok(score)
}

/// Static inputs shared by every valuation.
#[derive(Clone, Copy)]
pub struct ValuationContext<'a> {
    pub tables: &'a OddsTables,
    pub catalog: &'a dyn CatalogOracle,
    pub config: &'a ValuationConfig,
}

impl<'a> ValuationContext<'a> {
    pub fn new(
        tables: &'a OddsTables,
        catalog: &'a dyn CatalogOracle,
        config: &'a ValuationConfig,
    ) -> Self {
        Self {
            tables,
            catalog,
            config,
        }
    }
}

/// Partial sums over a batch of trials.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TrialTotals {
    pub trials: u64,
    pub rating: f64,
    pub plus_minus: f64,
    pub positive: u64,
    pub satisfied: u64,
}

impl Add for TrialTotals {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            trials: self.trials + rhs.trials,
            rating: self.rating + rhs.rating,
            plus_minus: self.plus_minus + rhs.plus_minus,
            positive: self.positive + rhs.positive,
            satisfied: self.satisfied + rhs.satisfied,
        }
    }
}

impl AddAssign for TrialTotals {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for TrialTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Final metrics for one (artifact, build) pair.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValuationReport {
    pub rating: f64,
    pub plus_minus: f64,
    pub positive_plus_minus_odds: f64,
    pub satisfaction_odds: f64,
}

/// A candidate artifact prepared for repeated trials against one build.
///
/// Construction resolves catalog references and computes everything that does
/// not depend on randomness; [`Valuator::run_trials`] may then be called any
/// number of times, from any number of threads.
pub struct Valuator<'a> {
    tables: &'a OddsTables,
    weights: PriorityWeights,
    build: &'a Build,
    character: Character,
    weapon: Option<Weapon>,
    candidate: &'a Artifact,
    equipped: Option<&'a Artifact>,
    loadout: &'a ArtifactSet,
    factor: f64,
    wrong_main_stat: bool,
}

impl<'a> Valuator<'a> {
    /// Prepares a valuation.
    ///
    /// `loadout` holds the artifacts currently equipped on the build; the one
    /// in the candidate's slot is the comparison baseline.
    ///
    /// # Errors
    ///
    /// Returns [`ValuationError::Catalog`] when the build's character or
    /// weapon is unknown.
    pub fn new(
        ctx: ValuationContext<'a>,
        candidate: &'a Artifact,
        build: &'a Build,
        loadout: &'a ArtifactSet,
    ) -> Result<Self, ValuationError> {
        let character = ctx.catalog.require_character(&build.character)?;
        let weapon = build
            .weapon
            .as_ref()
            .map(|id| ctx.catalog.require_weapon(id))
            .transpose()?;
        let factor = weighted_set_bonus_factor(
            candidate,
            &build.main_stats,
            &build.set_bonuses,
            ctx.tables,
        );

        Ok(Self {
            tables: ctx.tables,
            weights: ctx.config.priority_weights,
            build,
            character,
            weapon,
            candidate,
            equipped: loadout.get(candidate.slot),
            loadout,
            factor,
            wrong_main_stat: !build.accepts_main_stat(candidate.slot, candidate.main_stat),
        })
    }

    pub fn set_bonus_factor(&self) -> f64 {
        self.factor
    }

    /// True when the candidate's main stat is rejected, so every metric is 0.
    pub fn is_short_circuited(&self) -> bool {
        self.wrong_main_stat
    }

    fn score(&self, artifact: &Artifact) -> Result<f64, TableError> {
        score_artifact(artifact, self.build, self.tables, &self.weights)
    }

    fn trial<R>(&self, rng: &mut R) -> Result<TrialTotals, TableError>
    where
        R: Rng + ?Sized,
    {
        let rolled = roll_to_max(self.candidate, self.tables, rng)?;
        let rating = self.score(&rolled)?;
        let current = match self.equipped {
            Some(equipped) if equipped.id == self.candidate.id => rating,
            Some(equipped) => self.score(&roll_to_max(equipped, self.tables, rng)?)?,
            None => 0.0,
        };

        let swapped = self.loadout.with(rolled);
        let satisfaction = evaluate(
            &swapped,
            self.build,
            &self.character,
            self.weapon.as_ref(),
            self.tables,
            &EvaluateOptions::default(),
        )?;

        Ok(TrialTotals {
            trials: 1,
            rating,
            plus_minus: rating - current,
            positive: u64::from(rating > current),
            satisfied: u64::from(satisfaction.satisfied),
        })
    }

    /// Runs `trials` independent trials and returns their sums.
    ///
    /// # Errors
    ///
    /// Propagates the first table error; a broken table aborts the batch.
    pub fn run_trials<R>(&self, trials: u32, rng: &mut R) -> Result<TrialTotals, TableError>
    where
        R: Rng + ?Sized,
    {
        if self.wrong_main_stat {
            return Ok(TrialTotals {
                trials: u64::from(trials),
                ..TrialTotals::default()
            });
        }
        let mut totals = TrialTotals::default();
        for _ in 0..trials {
            totals += self.trial(rng)?;
        }
        Ok(totals)
    }

    /// Averages the totals and applies the set-bonus factor.
    ///
    /// # Errors
    ///
    /// Returns [`ValuationError::ZeroIterations`] when no trial was run.
    pub fn finish(&self, totals: TrialTotals) -> Result<ValuationReport, ValuationError> {
        if totals.trials == 0 {
            return Err(ValuationError::ZeroIterations);
        }
        if self.wrong_main_stat {
            return Ok(ValuationReport::default());
        }
        let n = totals.trials as f64;
        Ok(ValuationReport {
            rating: totals.rating / n * self.factor,
            plus_minus: totals.plus_minus / n * self.factor,
            positive_plus_minus_odds: totals.positive as f64 / n * self.factor,
            satisfaction_odds: totals.satisfied as f64 / n * self.factor,
        })
    }
}

/// Values `candidate` for `build` over `iterations` trials.
///
/// # Errors
///
/// Rejects zero iterations and unknown catalog references, and propagates
/// table errors.
pub fn valuate<R>(
    ctx: ValuationContext<'_>,
    candidate: &Artifact,
    build: &Build,
    loadout: &ArtifactSet,
    iterations: u32,
    rng: &mut R,
) -> Result<ValuationReport, ValuationError>
where
    R: Rng + ?Sized,
{
    if iterations == 0 {
        return Err(ValuationError::ZeroIterations);
    }
    let valuator = Valuator::new(ctx, candidate, build, loadout)?;
    let totals = valuator.run_trials(iterations, rng)?;
    valuator.finish(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{ArtifactSlot, Rarity};
    use crate::build::{BonusTier, StatPriority};
    use crate::env::{BaseStats, Catalog, StatBonus};
    use crate::ids::{ArtifactId, BuildId, CharacterId};
    use crate::stats::{OverallStatKey, StatKey};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn catalog() -> Catalog {
        Catalog::from_parts(
            [Character {
                id: CharacterId::new("ganyu"),
                base: BaseStats::new(9797.0, 335.0, 630.0),
                ascension: StatBonus::new(StatKey::CritDamage, 38.4),
            }],
            [],
        )
    }

    fn crit_build() -> Build {
        Build::new(BuildId(1), "ganyu")
            .with_main_stats(ArtifactSlot::Sands, [StatKey::AtkPercent])
            .with_desired_stat(OverallStatKey::CritRate, 60.0, StatPriority::High)
            .with_desired_stat(OverallStatKey::CritDamage, 180.0, StatPriority::High)
            .with_desired_stat(OverallStatKey::Atk, 2000.0, StatPriority::Medium)
    }

    fn sands(id: u64, main: StatKey) -> Artifact {
        Artifact::new(ArtifactId(id), ArtifactSlot::Sands, Rarity::FIVE, main, "wanderers_troupe")
            .with_substat(StatKey::CritRate, 3.89)
            .and_then(|a| a.with_substat(StatKey::CritDamage, 7.77))
            .and_then(|a| a.with_substat(StatKey::Hp, 298.75))
            .expect("legal sub-stats")
    }

    #[test]
    fn score_ignores_flat_stats_and_weights_priorities() {
        let tables = OddsTables::standard();
        let weights = PriorityWeights::default();
        let score = score_artifact(&sands(1, StatKey::AtkPercent), &crit_build(), &tables, &weights)
            .expect("complete tables");
        // one max crit-rate roll and one max crit-damage roll at high priority
        assert!((score - 2.0).abs() < 1e-12, "score {score}");

        let wrong = score_artifact(&sands(2, StatKey::HpPercent), &crit_build(), &tables, &weights)
            .expect("complete tables");
        assert_eq!(wrong, 0.0);
    }

    #[test]
    fn zero_iterations_is_rejected() {
        let tables = OddsTables::standard();
        let catalog = catalog();
        let config = ValuationConfig::default();
        let ctx = ValuationContext::new(&tables, &catalog, &config);
        let mut rng = StdRng::seed_from_u64(1);
        let result = valuate(
            ctx,
            &sands(1, StatKey::AtkPercent),
            &crit_build(),
            &ArtifactSet::new(),
            0,
            &mut rng,
        );
        assert_eq!(result, Err(ValuationError::ZeroIterations));
    }

    #[test]
    fn unknown_character_is_rejected() {
        let tables = OddsTables::standard();
        let catalog = Catalog::new();
        let config = ValuationConfig::default();
        let ctx = ValuationContext::new(&tables, &catalog, &config);
        let mut rng = StdRng::seed_from_u64(1);
        let result = valuate(
            ctx,
            &sands(1, StatKey::AtkPercent),
            &crit_build(),
            &ArtifactSet::new(),
            10,
            &mut rng,
        );
        assert!(matches!(result, Err(ValuationError::Catalog(_))));
    }

    #[test]
    fn wrong_main_stat_yields_all_zero() {
        let tables = OddsTables::standard();
        let catalog = catalog();
        let config = ValuationConfig::default();
        let ctx = ValuationContext::new(&tables, &catalog, &config);
        let mut rng = StdRng::seed_from_u64(2);
        let report = valuate(
            ctx,
            &sands(1, StatKey::DefPercent),
            &crit_build(),
            &ArtifactSet::new(),
            100,
            &mut rng,
        )
        .expect("valid inputs");
        assert_eq!(report, ValuationReport::default());
    }

    #[test]
    fn equipped_candidate_has_exactly_zero_plus_minus() {
        let tables = OddsTables::standard();
        let catalog = catalog();
        let config = ValuationConfig::default();
        let ctx = ValuationContext::new(&tables, &catalog, &config);
        let mut rng = StdRng::seed_from_u64(3);
        let candidate = sands(7, StatKey::AtkPercent);
        let loadout = ArtifactSet::from_artifacts([candidate.clone()]);
        let build = crit_build().with_equipped(ArtifactSlot::Sands, candidate.id);

        let report = valuate(ctx, &candidate, &build, &loadout, 200, &mut rng).expect("valid inputs");
        assert_eq!(report.plus_minus, 0.0);
        assert_eq!(report.positive_plus_minus_odds, 0.0);
        assert!(report.rating > 0.0);
    }

    #[test]
    fn empty_slot_makes_every_scoring_trial_positive() {
        let tables = OddsTables::standard();
        let catalog = catalog();
        let config = ValuationConfig::default();
        let ctx = ValuationContext::new(&tables, &catalog, &config);
        let mut rng = StdRng::seed_from_u64(4);
        let report = valuate(
            ctx,
            &sands(1, StatKey::AtkPercent),
            &crit_build(),
            &ArtifactSet::new(),
            200,
            &mut rng,
        )
        .expect("valid inputs");
        assert_eq!(report.positive_plus_minus_odds, 1.0);
        assert!((report.rating - report.plus_minus).abs() < 1e-9);
    }

    #[test]
    fn off_set_candidate_is_discounted() {
        let tables = OddsTables::standard();
        let catalog = catalog();
        let config = ValuationConfig::default();
        let ctx = ValuationContext::new(&tables, &catalog, &config);
        let build = crit_build().with_set_bonus("blizzard_strayer", BonusTier::FourPiece);
        let candidate = sands(1, StatKey::AtkPercent);
        let loadout = ArtifactSet::new();

        let valuator = Valuator::new(ctx, &candidate, &build, &loadout).expect("known character");
        assert!(valuator.set_bonus_factor() > 0.0 && valuator.set_bonus_factor() < 1.0);

        let mut rng = StdRng::seed_from_u64(5);
        let totals = valuator.run_trials(100, &mut rng).expect("complete tables");
        let report = valuator.finish(totals).expect("trials ran");
        assert!(report.positive_plus_minus_odds <= valuator.set_bonus_factor());
    }

    #[test]
    fn split_trials_sum_like_a_single_batch() {
        let tables = OddsTables::standard();
        let catalog = catalog();
        let config = ValuationConfig::default();
        let ctx = ValuationContext::new(&tables, &catalog, &config);
        let build = crit_build();
        let candidate = sands(1, StatKey::AtkPercent);
        let loadout = ArtifactSet::new();
        let valuator = Valuator::new(ctx, &candidate, &build, &loadout).expect("known character");

        let mut rng = StdRng::seed_from_u64(6);
        let chunks: TrialTotals = (0..4)
            .map(|_| valuator.run_trials(25, &mut rng).expect("complete tables"))
            .sum();
        assert_eq!(chunks.trials, 100);
        assert!(valuator.finish(chunks).is_ok());
    }

    #[test]
    fn more_iterations_reduce_variance() {
        let tables = OddsTables::standard();
        let catalog = catalog();
        let config = ValuationConfig::default();
        let ctx = ValuationContext::new(&tables, &catalog, &config);
        let build = crit_build();
        let candidate = sands(1, StatKey::AtkPercent);
        let loadout = ArtifactSet::new();
        let mut rng = StdRng::seed_from_u64(7);

        let mut variance = |iterations: u32| {
            let ratings: Vec<f64> = (0..30)
                .map(|_| {
                    valuate(ctx, &candidate, &build, &loadout, iterations, &mut rng)
                        .expect("valid inputs")
                        .rating
                })
                .collect();
            let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
            ratings.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / ratings.len() as f64
        };

        let coarse = variance(5);
        let fine = variance(500);
        assert!(fine < coarse, "variance at 500 ({fine}) not below variance at 5 ({coarse})");
    }

    #[test]
    fn unconstrained_build_is_plain_substat_scoring() {
        let tables = OddsTables::standard();
        let catalog = catalog();
        let config = ValuationConfig::default();
        let ctx = ValuationContext::new(&tables, &catalog, &config);
        let build = Build::new(BuildId(2), "ganyu")
            .with_desired_stat(OverallStatKey::CritRate, 60.0, StatPriority::High)
            .with_desired_stat(OverallStatKey::CritDamage, 180.0, StatPriority::Medium);
        let candidate = sands(1, StatKey::DefPercent);
        let loadout = ArtifactSet::new();

        let valuator = Valuator::new(ctx, &candidate, &build, &loadout).expect("known character");
        assert_eq!(valuator.set_bonus_factor(), 1.0);
        assert!(!valuator.is_short_circuited());

        let iterations = 300;
        let report = valuate(
            ctx,
            &candidate,
            &build,
            &loadout,
            iterations,
            &mut StdRng::seed_from_u64(9),
        )
        .expect("valid inputs");

        // an empty loadout draws nothing besides the candidate's rolls
        let mut rng = StdRng::seed_from_u64(9);
        let mut total = 0.0;
        for _ in 0..iterations {
            let rolled = roll_to_max(&candidate, &tables, &mut rng).expect("complete tables");
            total += score_artifact(&rolled, &build, &tables, &config.priority_weights)
                .expect("complete tables");
        }
        let mean = total / f64::from(iterations);

        assert!((report.rating - mean).abs() < 1e-12, "rating {} mean {mean}", report.rating);
        assert!(report.rating > 0.0);
    }
}
