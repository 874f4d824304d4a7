use std::{fmt, str::FromStr};

use arrayvec::ArrayVec;
use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Deals pieces using the 7-bag randomization algorithm.
///
/// Each bag holds all 7 piece kinds in shuffled order. Pieces are dealt from
/// the bag until it is empty, then a freshly shuffled bag takes its place, so
/// every kind appears exactly once per 7 consecutive pieces of a bag.
///
/// # Example
///
/// ```
/// use tetrobot_engine::{PieceGenerator, PieceKind};
///
/// let mut generator = PieceGenerator::new();
/// let mut first_bag: Vec<_> = (0..7).map(|_| generator.pop_next()).collect();
/// first_bag.sort_by_key(|kind| kind.color_id());
/// assert_eq!(first_bag, PieceKind::ALL);
/// ```
#[derive(Debug, Clone)]
pub struct PieceGenerator {
    rng: Pcg32,
    bag: ArrayVec<PieceKind, { PieceKind::LEN }>,
}

impl Default for PieceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceGenerator {
    /// Creates a generator with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic piece generation.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
            bag: ArrayVec::new(),
        }
    }

    /// Deals the next piece, refilling the bag when it runs empty.
    pub fn pop_next(&mut self) -> PieceKind {
        if self.bag.is_empty() {
            let mut new_bag = PieceKind::ALL;
            new_bag.shuffle(&mut self.rng);
            // dealt from the back
            self.bag.extend(new_bag.into_iter().rev());
        }
        match self.bag.pop() {
            Some(kind) => kind,
            None => unreachable!("bag was just refilled"),
        }
    }

    /// Pieces left in the current bag, in dealing order.
    pub fn remaining(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.bag.iter().rev().copied()
    }
}

/// Seed for deterministic piece generation.
///
/// This is a 128-bit (16-byte) seed for the generator's RNG. Using the same
/// seed produces the same piece sequence, which makes games reproducible and
/// lets different strategies be compared on identical input.
///
/// Seeds are written as 32 hex digits, both by `Display` and by serde.
///
/// # Example
///
/// ```
/// use tetrobot_engine::{PieceGenerator, PieceSeed};
///
/// let seed: PieceSeed = "000102030405060708090a0b0c0d0e0f".parse().unwrap();
/// assert_eq!(seed.to_string(), "000102030405060708090a0b0c0d0e0f");
///
/// let mut a = PieceGenerator::with_seed(seed);
/// let mut b = PieceGenerator::with_seed(seed);
/// assert!((0..20).all(|_| a.pop_next() == b.pop_next()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

/// Error returned when a [`PieceSeed`] is not 32 hex digits.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed {input:?}: expected 32 hex digits")]
pub struct ParseSeedError {
    input: String,
}

impl PieceSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for PieceSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSeedError {
            input: s.to_owned(),
        };
        if s.len() != 32 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| err())?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `PieceSeed` values with `rng.random()`.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}
