use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Index of a target in the ring
pub type TargetId = usize;

/// Picks the next target to arm, never repeating the excluded one when the
/// ring has more than one target.
#[derive(Debug, Clone)]
pub struct TargetSelector<R: Rng = StdRng> {
    rng: R,
}

impl TargetSelector<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl Default for TargetSelector<StdRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: Rng> TargetSelector<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Uniform pick in `0..count`, skipping `excluding`.
    ///
    /// Draws from the `count - 1` permitted slots and shifts draws at or above
    /// the excluded index up by one, so every permitted id is equally likely.
    /// With a single target the exclusion cannot be honored and `0` is
    /// returned. An out-of-range exclusion is treated as no exclusion.
    ///
    /// # Panics
    ///
    /// Panics if `count` is zero.
    pub fn pick(&mut self, excluding: Option<TargetId>, count: usize) -> TargetId {
        assert!(count > 0, "target count must be positive");
        if count == 1 {
            return 0;
        }

        match excluding {
            Some(x) if x < count => {
                let draw = self.rng.gen_range(0..count - 1);
                if draw >= x {
                    draw + 1
                } else {
                    draw
                }
            }
            _ => self.rng.gen_range(0..count),
        }
    }
}
