//! Heuristic board evaluation.
//!
//! A landed board is scored as a weighted sum of four features:
//!
//! ```text
//! score = w_bumpiness * bumpiness
//!       + w_height    * aggregate_height
//!       + w_holes     * holes
//!       + w_cleared   * normalized(cleared)
//! ```
//!
//! `normalized(cleared)` is the line-clear reward in units of a single-line
//! clear (`[0, 1, 2.5, 7.5, 30]` with the default reward table), which keeps the
//! cleared term on the same scale as the small-integer board features.

use std::{fmt, num::ParseFloatError, str::FromStr};

use serde::{Deserialize, Serialize};
use tetrobot_engine::{BoardStatistics, RewardTable};

/// Scores a landed board state (higher is better).
pub trait BoardEvaluator: fmt::Debug + Send + Sync {
    fn evaluate(&self, stats: &BoardStatistics) -> f32;
}

/// Weight vector `[bumpiness, height, holes, cleared]`.
///
/// Weights are plain configuration values: the same weights always produce
/// the same decisions. Every weight is finite; parsing and deserializing both
/// reject `NaN` and infinities.
///
/// # Example
///
/// ```
/// use tetrobot_agent::HeuristicWeights;
///
/// let weights: HeuristicWeights = "-1, -1, -1, 1".parse().unwrap();
/// assert_eq!(weights.to_array(), [-1.0, -1.0, -1.0, 1.0]);
/// assert_eq!(weights.to_string(), "-1,-1,-1,1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWeights")]
pub struct HeuristicWeights {
    pub bumpiness: f32,
    pub height: f32,
    pub holes: f32,
    pub cleared: f32,
}

impl HeuristicWeights {
    pub const LEN: usize = 4;

    /// Hand-tuned weights that play reasonably well on a 10×20 board.
    pub const BASELINE: Self = Self::new(-0.184, -0.51, -0.357, 0.761);

    #[must_use]
    pub const fn new(bumpiness: f32, height: f32, holes: f32, cleared: f32) -> Self {
        Self {
            bumpiness,
            height,
            holes,
            cleared,
        }
    }

    #[must_use]
    pub const fn from_array([bumpiness, height, holes, cleared]: [f32; Self::LEN]) -> Self {
        Self::new(bumpiness, height, holes, cleared)
    }

    #[must_use]
    pub const fn to_array(self) -> [f32; Self::LEN] {
        [self.bumpiness, self.height, self.holes, self.cleared]
    }
}

impl fmt::Display for HeuristicWeights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [b, h, o, c] = self.to_array();
        match f.precision() {
            Some(p) => write!(f, "{b:.p$},{h:.p$},{o:.p$},{c:.p$}"),
            None => write!(f, "{b},{h},{o},{c}"),
        }
    }
}

/// Error returned when parsing [`HeuristicWeights`] from a string.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseWeightsError {
    #[display("expected 4 comma-separated weights, got {count}")]
    WrongLength { count: usize },
    #[display("invalid weight {input:?}")]
    InvalidNumber {
        input: String,
        source: ParseFloatError,
    },
    #[display("weight {input:?} is not finite")]
    NonFinite { input: String },
}

fn finite(input: &str, value: f32) -> Result<f32, ParseWeightsError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParseWeightsError::NonFinite {
            input: input.to_owned(),
        })
    }
}

impl FromStr for HeuristicWeights {
    type Err = ParseWeightsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let Ok(parts) = <[&str; Self::LEN]>::try_from(parts.as_slice()) else {
            return Err(ParseWeightsError::WrongLength { count: parts.len() });
        };
        let mut weights = [0.0; Self::LEN];
        for (w, part) in weights.iter_mut().zip(parts) {
            let value = part
                .parse()
                .map_err(|source| ParseWeightsError::InvalidNumber {
                    input: part.to_owned(),
                    source,
                })?;
            *w = finite(part, value)?;
        }
        Ok(Self::from_array(weights))
    }
}

#[derive(Deserialize)]
struct RawWeights {
    bumpiness: f32,
    height: f32,
    holes: f32,
    cleared: f32,
}

impl TryFrom<RawWeights> for HeuristicWeights {
    type Error = ParseWeightsError;

    fn try_from(raw: RawWeights) -> Result<Self, Self::Error> {
        Ok(Self::new(
            finite("bumpiness", raw.bumpiness)?,
            finite("height", raw.height)?,
            finite("holes", raw.holes)?,
            finite("cleared", raw.cleared)?,
        ))
    }
}

/// Linear evaluator over [`BoardStatistics`].
///
/// # Example
///
/// ```
/// use tetrobot_agent::{BoardEvaluator as _, HeuristicEvaluator, HeuristicWeights};
/// use tetrobot_engine::BoardStatistics;
///
/// let evaluator = HeuristicEvaluator::new(HeuristicWeights::new(-1.0, -1.0, -1.0, 1.0));
/// let stats = BoardStatistics {
///     bumpiness: 2,
///     aggregate_height: 4,
///     holes: 0,
///     cleared: 2,
/// };
/// assert_eq!(evaluator.evaluate(&stats), -6.0 + 2.5);
/// ```
#[derive(Debug, Clone)]
pub struct HeuristicEvaluator {
    weights: HeuristicWeights,
    rewards: RewardTable,
}

impl HeuristicEvaluator {
    /// Creates an evaluator normalizing line clears with the default reward table.
    #[must_use]
    pub fn new(weights: HeuristicWeights) -> Self {
        Self::with_rewards(weights, RewardTable::DEFAULT)
    }

    #[must_use]
    pub fn with_rewards(weights: HeuristicWeights, rewards: RewardTable) -> Self {
        Self { weights, rewards }
    }

    #[must_use]
    pub fn weights(&self) -> &HeuristicWeights {
        &self.weights
    }
}

impl BoardEvaluator for HeuristicEvaluator {
    #[expect(clippy::cast_precision_loss)]
    #[inline]
    fn evaluate(&self, stats: &BoardStatistics) -> f32 {
        let w = &self.weights;
        w.bumpiness * stats.bumpiness as f32
            + w.height * stats.aggregate_height as f32
            + w.holes * stats.holes as f32
            + w.cleared * self.rewards.normalized(stats.cleared)
    }
}
