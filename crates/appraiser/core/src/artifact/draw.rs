//! Weighted random selection over odds-table entries.

use rand::Rng;

use crate::env::TableError;

/// Draws one candidate with probability proportional to its weight.
///
/// A uniform value in `[0, total)` is walked against the cumulative weights.
/// For probability tables `total` is `1.0`; for relative weights it is the
/// weight sum. If the candidates are exhausted before the cumulative weight
/// passes the drawn value the table is broken, and the draw fails with
/// [`TableError::DrawExhausted`] instead of falling back to the last entry.
///
/// # Errors
///
/// Returns [`TableError::DrawExhausted`] when the weights sum to less than the
/// drawn value (including an empty candidate list).
pub fn weighted_choice<T, R>(
    candidates: &[(T, f64)],
    total: f64,
    table: &'static str,
    rng: &mut R,
) -> Result<T, TableError>
where
    T: Clone,
    R: Rng + ?Sized,
{
    let drawn = rng.gen_range(0.0..1.0) * total;
    let mut cumulative = 0.0;
    for (candidate, weight) in candidates {
        cumulative += weight;
        if drawn < cumulative {
            return Ok(candidate.clone());
        }
    }
    Err(TableError::DrawExhausted {
        table,
        drawn,
        reached: cumulative,
    })
}

/// Draws from relative (non-normalized) weights.
pub(crate) fn weighted_choice_relative<T, R>(
    candidates: &[(T, f64)],
    table: &'static str,
    rng: &mut R,
) -> Result<T, TableError>
where
    T: Clone,
    R: Rng + ?Sized,
{
    let total: f64 = candidates.iter().map(|(_, w)| w).sum();
    weighted_choice(candidates, total, table, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn probability_table_short_of_one_fails_loudly() {
        let mut rng = StdRng::seed_from_u64(7);
        let broken = [("a", 0.1), ("b", 0.1)];
        let failures = (0..200)
            .filter(|_| weighted_choice(&broken, 1.0, "test", &mut rng).is_err())
            .count();
        assert!(failures > 100, "only {failures} of 200 draws failed");
    }

    #[test]
    fn complete_probability_table_always_draws() {
        let mut rng = StdRng::seed_from_u64(13);
        let table = [("a", 0.25), ("b", 0.25), ("c", 0.5)];
        for _ in 0..1_000 {
            assert!(weighted_choice(&table, 1.0, "test", &mut rng).is_ok());
        }
    }

    #[test]
    fn empty_candidates_are_an_error() {
        let mut rng = StdRng::seed_from_u64(1);
        let empty: [(u8, f64); 0] = [];
        assert!(matches!(
            weighted_choice_relative(&empty, "empty", &mut rng),
            Err(TableError::DrawExhausted { .. })
        ));
    }

    #[test]
    fn zero_weight_candidates_are_never_drawn() {
        let mut rng = StdRng::seed_from_u64(3);
        let table = [("never", 0.0), ("always", 4.0), ("never_either", 0.0)];
        for _ in 0..500 {
            assert_eq!(
                weighted_choice_relative(&table, "test", &mut rng),
                Ok("always")
            );
        }
    }

    #[test]
    fn relative_weights_follow_proportions() {
        let mut rng = StdRng::seed_from_u64(11);
        let table = [(0u8, 1.0), (1u8, 3.0)];
        let heavy = (0..10_000)
            .filter(|_| weighted_choice_relative(&table, "test", &mut rng) == Ok(1))
            .count();
        assert!((7_000..8_000).contains(&heavy), "heavy drawn {heavy} times");
    }
}
