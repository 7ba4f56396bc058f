//! The check driver: run trials at growing sizes, then greedily shrink
//! the first failure.

use log::{debug, trace};

use crate::data::{random_seed_value, Options, Seed, Size};
use crate::property::{Outcome, Property};
use crate::tree::Tree;

/// The result of the shrink search over a failing trial.
#[derive(Debug, Clone, PartialEq)]
pub struct Shrunk<A> {
    /// Outcome at the shrunk arguments; always a failure.
    pub result: Outcome,

    /// The locally minimal failing arguments.
    pub smallest: A,

    /// How many shrink steps were taken.
    pub depth: usize,

    /// How many candidate nodes were examined, successful or not.
    pub total_nodes_visited: usize,
}

/// The result of a `check` call. Field names and semantics are a stable
/// contract for runner adapters.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult<A> {
    /// `Passed` when every trial passed, otherwise the first failing
    /// outcome.
    pub result: Outcome,

    /// Number of trials run, counting the failing one.
    pub num_tests: usize,

    /// The seed that reproduces this run.
    pub seed: u64,

    /// Arguments of the first failing trial.
    pub fail: Option<A>,

    /// Size at which the failure was generated.
    pub failing_size: Option<Size>,

    /// Shrink-search outcome; present exactly when `fail` is.
    pub shrunk: Option<Shrunk<A>>,
}

impl<A> CheckResult<A> {
    /// Whether every trial passed.
    pub fn passed(&self) -> bool {
        !self.result.is_failure()
    }
}

/// Run the property `options.times` times with linearly growing size,
/// stopping at the first failure and shrinking it.
///
/// A successful check never panics. A misconfigured setup does: invalid
/// options fail fast here, and generator exhaustion propagates from the
/// trial that hits it.
pub fn check<A>(property: &Property<A>, options: &Options) -> CheckResult<A>
where
    A: Clone + 'static,
{
    if let Err(error) = options.validate() {
        panic!("{error}")
    }
    let seed_value = options.seed.unwrap_or_else(random_seed_value);
    let mut seed = Seed::from_u64(seed_value);
    for trial in 0..options.times {
        let size = Size::new(trial * options.max_size / options.times);
        let (trial_seed, rest) = seed.split();
        seed = rest;
        let tree = property.generate(size, trial_seed);
        let outcome = property.evaluate(&tree.value);
        trace!("trial {} at {}: {:?}", trial, size, outcome);
        if outcome.is_failure() {
            let fail = tree.value.clone();
            let shrunk = shrink(property, &tree, outcome.clone());
            return CheckResult {
                result: outcome,
                num_tests: trial + 1,
                seed: seed_value,
                fail: Some(fail),
                failing_size: Some(size),
                shrunk: Some(shrunk),
            };
        }
    }
    CheckResult {
        result: Outcome::Passed,
        num_tests: options.times,
        seed: seed_value,
        fail: None,
        failing_size: None,
        shrunk: None,
    }
}

/// Greedy depth-first descent over the failing tree.
///
/// Children are scanned in order; the first failing child becomes the new
/// current node and the scan restarts from its children. Every examined
/// child counts toward `total_nodes_visited`, whether or not it is
/// descended into. The walk stops at the first node with no failing
/// child.
fn shrink<A>(property: &Property<A>, failing: &Tree<A>, outcome: Outcome) -> Shrunk<A>
where
    A: Clone + 'static,
{
    let mut current = failing.clone();
    let mut result = outcome;
    let mut depth = 0;
    let mut total_nodes_visited = 0;
    loop {
        let mut descended = false;
        for child in current.children() {
            total_nodes_visited += 1;
            let child_outcome = property.evaluate(&child.value);
            if child_outcome.is_failure() {
                current = child;
                result = child_outcome;
                depth += 1;
                descended = true;
                debug!(
                    "shrink step {}: {} nodes visited so far",
                    depth, total_nodes_visited
                );
                break;
            }
        }
        if !descended {
            break;
        }
    }
    Shrunk {
        result,
        smallest: current.value.clone(),
        depth,
        total_nodes_visited,
    }
}
