//! Core data types: sizes, splittable seeds, and check options.

use std::fmt;

use crate::error::Error;

/// Size parameter controlling the magnitude of generated data.
///
/// Size grows across the trials of a single check, so early trials probe
/// small inputs and later trials probe large ones. Generators treat it as a
/// hint, not a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Size(pub usize);

impl Size {
    /// Create a new size value.
    pub fn new(value: usize) -> Self {
        Size(value)
    }

    /// Get the inner size value.
    pub fn get(&self) -> usize {
        self.0
    }

    /// Bump the size by one, for retry escalation.
    pub fn grow(&self) -> Self {
        Size(self.0.saturating_add(1))
    }

    /// Halve the size, for recursive generators that must bottom out.
    pub fn halve(&self) -> Self {
        Size(self.0 / 2)
    }

    /// Clamp size to a maximum value.
    pub fn clamp(&self, max: usize) -> Self {
        Size(self.0.min(max))
    }
}

impl From<usize> for Size {
    fn from(value: usize) -> Self {
        Size(value)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Size({})", self.0)
    }
}

/// Splittable random seed for deterministic generation.
///
/// A SplitMix64 state plus its stream constant. All operations are pure:
/// they return the advanced seed rather than mutating. Splitting yields two
/// streams that are independent for practical purposes, so sibling
/// generator calls never perturb each other's draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Seed {
    state: u64,
    gamma: u64,
}

impl Seed {
    /// Derive a seed from a single integer. The same input always produces
    /// the same stream.
    pub fn from_u64(value: u64) -> Self {
        let state = mix64(value);
        let gamma = mix_gamma(state);
        Seed { state, gamma }
    }

    /// Draw a fresh seed from the operating system's entropy.
    pub fn random() -> Self {
        Seed::from_u64(random_seed_value())
    }

    /// Split into two independent seeds.
    ///
    /// The left seed continues the current stream; the right one derives a
    /// new stream constant from the mixed output, SplitMix64-style.
    pub fn split(self) -> (Self, Self) {
        let state = self.state.wrapping_add(self.gamma);
        let output = mix64(state);
        let left = Seed {
            state,
            gamma: self.gamma,
        };
        let right = Seed {
            state: output,
            gamma: mix_gamma(output),
        };
        (left, right)
    }

    /// Produce the next 64-bit value and the advanced seed.
    pub fn next_u64(self) -> (u64, Self) {
        let state = self.state.wrapping_add(self.gamma);
        let output = mix64(state);
        (
            output,
            Seed {
                state,
                gamma: self.gamma,
            },
        )
    }

    /// Produce a value in `[0, bound)` using the widening-multiply high word.
    ///
    /// A `bound` of zero yields zero.
    pub fn next_bounded(self, bound: u64) -> (u64, Self) {
        let (value, seed) = self.next_u64();
        ((value as u128 * bound as u128 >> 64) as u64, seed)
    }

    /// Produce a random boolean.
    pub fn next_bool(self) -> (bool, Self) {
        let (value, seed) = self.next_u64();
        (value & 1 == 1, seed)
    }

    /// Produce a float in `[0, 1)` from the top 53 bits.
    pub fn next_f64(self) -> (f64, Self) {
        let (value, seed) = self.next_u64();
        ((value >> 11) as f64 * (1.0 / (1u64 << 53) as f64), seed)
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed({}, {})", self.state, self.gamma)
    }
}

/// Draw a raw seed value from the host RNG.
pub(crate) fn random_seed_value() -> u64 {
    use rand::Rng;
    rand::thread_rng().gen()
}

/// SplitMix64 finalizer.
fn mix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Derive an odd stream constant for a split-off seed.
fn mix_gamma(z: u64) -> u64 {
    (mix64(z) | 1).wrapping_mul(0x9e3779b97f4a7c15)
}

/// Configuration for `check` and `sample`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Number of trials to run.
    pub times: usize,

    /// Upper bound on the size parameter.
    pub max_size: usize,

    /// Seed for the random source. `None` draws a fresh one per call.
    pub seed: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            times: 100,
            max_size: 200,
            seed: None,
        }
    }
}

impl Options {
    /// Set the number of trials.
    pub fn with_times(mut self, times: usize) -> Self {
        self.times = times;
        self
    }

    /// Set the maximum size.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Fix the seed so the run is reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject configurations that cannot run a single trial.
    pub fn validate(&self) -> Result<(), Error> {
        if self.times == 0 {
            return Err(Error::InvalidOptions {
                message: "times must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let a = Seed::from_u64(42);
        let b = Seed::from_u64(42);
        let (x1, a) = a.next_u64();
        let (y1, b) = b.next_u64();
        let (x2, _) = a.next_u64();
        let (y2, _) = b.next_u64();
        assert_eq!(x1, y1);
        assert_eq!(x2, y2);
    }

    #[test]
    fn split_streams_diverge() {
        let (left, right) = Seed::from_u64(7).split();
        let (l, _) = left.next_u64();
        let (r, _) = right.next_u64();
        assert_ne!(l, r);
    }

    #[test]
    fn split_is_deterministic() {
        let (l1, r1) = Seed::from_u64(99).split();
        let (l2, r2) = Seed::from_u64(99).split();
        assert_eq!(l1, l2);
        assert_eq!(r1, r2);
    }

    #[test]
    fn bounded_draws_stay_in_range() {
        let mut seed = Seed::from_u64(5);
        for _ in 0..1000 {
            let (v, next) = seed.next_bounded(17);
            assert!(v < 17);
            seed = next;
        }
    }

    #[test]
    fn unit_floats_stay_in_range() {
        let mut seed = Seed::from_u64(11);
        for _ in 0..1000 {
            let (v, next) = seed.next_f64();
            assert!((0.0..1.0).contains(&v));
            seed = next;
        }
    }

    #[test]
    fn zero_times_is_invalid() {
        let options = Options::default().with_times(0);
        assert!(options.validate().is_err());
    }

    #[test]
    fn default_options() {
        let options = Options::default();
        assert_eq!(options.times, 100);
        assert_eq!(options.max_size, 200);
        assert_eq!(options.seed, None);
        assert!(options.validate().is_ok());
    }
}
