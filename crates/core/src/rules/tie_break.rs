//! Left/right tie-break capability
//!
//! Whenever a falling or flowing cell has two equally good vacancies, the rule
//! engine asks a [`TieBreak`] which side to take. Production code uses a
//! seedable random source; tests force either branch deterministically.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Picks one of two equally valid sides
pub trait TieBreak {
    /// `true` for the left (`x - 1`) target, `false` for the right (`x + 1`)
    fn pick_left(&mut self) -> bool;

    /// Horizontal offset of the chosen side (`-1` or `+1`)
    #[inline]
    fn pick_offset(&mut self) -> i32 {
        if self.pick_left() {
            -1
        } else {
            1
        }
    }
}

impl<T: TieBreak + ?Sized> TieBreak for &mut T {
    fn pick_left(&mut self) -> bool {
        (**self).pick_left()
    }
}

/// Uniform, independent coin flips from a `StdRng`
#[derive(Debug, Clone)]
pub struct RandomTieBreak {
    rng: StdRng,
}

impl RandomTieBreak {
    /// Reproducible sequence from a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed from operating system entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Seeded when `seed` is given, entropy otherwise
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }
}

impl TieBreak for RandomTieBreak {
    #[inline]
    fn pick_left(&mut self) -> bool {
        self.rng.random_bool(0.5)
    }
}

/// Deterministic tie-break for tests and replays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedTieBreak {
    AlwaysLeft,
    AlwaysRight,
    /// Alternates starting with the given side (`true` = left)
    Alternate(bool),
}

impl TieBreak for FixedTieBreak {
    fn pick_left(&mut self) -> bool {
        match self {
            FixedTieBreak::AlwaysLeft => true,
            FixedTieBreak::AlwaysRight => false,
            FixedTieBreak::Alternate(next) => {
                let left = *next;
                *next = !left;
                left
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_tie_breaks() {
        assert_eq!(FixedTieBreak::AlwaysLeft.pick_offset(), -1);
        assert_eq!(FixedTieBreak::AlwaysRight.pick_offset(), 1);

        let mut alt = FixedTieBreak::Alternate(true);
        let picks: Vec<bool> = (0..4).map(|_| alt.pick_left()).collect();
        assert_eq!(picks, vec![true, false, true, false]);
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = RandomTieBreak::seeded(42);
        let mut b = RandomTieBreak::seeded(42);
        for _ in 0..64 {
            assert_eq!(a.pick_left(), b.pick_left());
        }
    }

    #[test]
    fn test_random_hits_both_sides() {
        let mut t = RandomTieBreak::seeded(7);
        let lefts = (0..1000).filter(|_| t.pick_left()).count();
        assert!(lefts > 350 && lefts < 650, "biased tie-break: {lefts}/1000");
    }
}
