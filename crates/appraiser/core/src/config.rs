use crate::build::StatPriority;

/// Weight applied to each desired stat's roll fraction when scoring.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PriorityWeights {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl PriorityWeights {
    pub const fn weight(&self, priority: StatPriority) -> f64 {
        match priority {
            StatPriority::Low => self.low,
            StatPriority::Medium => self.medium,
            StatPriority::High => self.high,
        }
    }
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            low: 0.25,
            medium: 0.5,
            high: 1.0,
        }
    }
}

/// Tunable parameters of the valuation engine.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ValuationConfig {
    pub priority_weights: PriorityWeights,
    /// Trials per (artifact, build) pair when the caller does not specify.
    pub default_iterations: u32,
}

impl ValuationConfig {
    pub const DEFAULT_ITERATIONS: u32 = 1_000;

    pub fn new() -> Self {
        Self {
            priority_weights: PriorityWeights::default(),
            default_iterations: Self::DEFAULT_ITERATIONS,
        }
    }

    pub fn with_default_iterations(mut self, iterations: u32) -> Self {
        self.default_iterations = iterations;
        self
    }
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self::new()
    }
}
