//! Weight vector operators for the genetic algorithm.
//!
//! Every operator keeps the sign convention of [`HeuristicWeights`]: the
//! bumpiness, height and holes weights are penalties in `[-max_weight, 0]`,
//! and the cleared weight is a reward in `[0, max_weight]`.
//!
//! - **Initialization**: [`random`] samples each magnitude uniformly.
//! - **Crossover**: [`crossover`] swaps the halves of two parents at the midpoint.
//! - **Mutation**: [`mutate`] adds Gaussian noise to each weight with a fixed
//!   probability, then clamps it back into its sign range.

use rand::Rng;
use rand_distr::{Distribution as _, Normal};
use tetrobot_agent::HeuristicWeights;

/// Whether each of `[bumpiness, height, holes, cleared]` is a reward.
const IS_REWARD: [bool; HeuristicWeights::LEN] = [false, false, false, true];

fn clamp_to_sign(value: f32, is_reward: bool, max_weight: f32) -> f32 {
    if is_reward {
        value.clamp(0.0, max_weight)
    } else {
        value.clamp(-max_weight, 0.0)
    }
}

/// Samples a weight vector with every magnitude uniform in `[0, max_weight]`.
///
/// # Panics
///
/// Panics if `max_weight` is negative or not finite.
///
/// # Example
///
/// ```
/// let weights = tetrobot_training::weights::random(&mut rand::rng(), 10.0);
/// assert!((-10.0..=0.0).contains(&weights.holes));
/// assert!((0.0..=10.0).contains(&weights.cleared));
/// ```
pub fn random<R>(rng: &mut R, max_weight: f32) -> HeuristicWeights
where
    R: Rng + ?Sized,
{
    HeuristicWeights::from_array(IS_REWARD.map(|is_reward| {
        let magnitude = rng.random_range(0.0..=max_weight);
        if is_reward { magnitude } else { -magnitude }
    }))
}

/// Single-point crossover at the midpoint of the weight vector.
///
/// The first child takes the front half of `p1` and the back half of `p2`,
/// the second child the reverse.
#[must_use]
pub fn crossover(
    p1: &HeuristicWeights,
    p2: &HeuristicWeights,
) -> (HeuristicWeights, HeuristicWeights) {
    const MIDPOINT: usize = HeuristicWeights::LEN / 2;
    let (a, b) = (p1.to_array(), p2.to_array());
    let mut child1 = a;
    let mut child2 = b;
    child1[MIDPOINT..].copy_from_slice(&b[MIDPOINT..]);
    child2[MIDPOINT..].copy_from_slice(&a[MIDPOINT..]);
    (
        HeuristicWeights::from_array(child1),
        HeuristicWeights::from_array(child2),
    )
}

/// Gaussian mutation.
///
/// Each weight is perturbed by a sample of `noise` with probability `rate`,
/// then clamped into its sign range.
///
/// # Panics
///
/// Panics if `rate` is outside `[0, 1]`.
pub fn mutate<R>(
    weights: HeuristicWeights,
    noise: &Normal<f32>,
    rate: f64,
    max_weight: f32,
    rng: &mut R,
) -> HeuristicWeights
where
    R: Rng + ?Sized,
{
    let mut values = weights.to_array();
    for (w, is_reward) in values.iter_mut().zip(IS_REWARD) {
        if rng.random_bool(rate) {
            *w = clamp_to_sign(*w + noise.sample(rng), is_reward, max_weight);
        }
    }
    HeuristicWeights::from_array(values)
}
