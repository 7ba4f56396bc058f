//! Properties: argument generators paired with an outcome function.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use crate::data::{Seed, Size};
use crate::gen::Gen;
use crate::tree::Tree;

/// The result of one predicate evaluation.
///
/// A panicking predicate is captured as `Errored` with the panic message;
/// it counts as a failure for the shrink search and never unwinds through
/// the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed,
    Errored(String),
}

impl Outcome {
    /// Whether this outcome falsifies the property.
    pub fn is_failure(&self) -> bool {
        !matches!(self, Outcome::Passed)
    }
}

/// A property under test: a generator for the argument tuple and a
/// function producing an outcome for any argument value.
///
/// The argument tree's children vary exactly one argument at a time, so
/// the shrink search explores per-argument simplifications in argument
/// order.
pub struct Property<A> {
    args: Gen<A>,
    test: Rc<dyn Fn(&A) -> Outcome>,
}

impl<A: Clone + 'static> Property<A> {
    /// Create a property from an argument generator and an outcome
    /// function.
    pub fn new<F>(args: Gen<A>, test: F) -> Self
    where
        F: Fn(&A) -> Outcome + 'static,
    {
        Property {
            args,
            test: Rc::new(test),
        }
    }

    /// Generate an argument tree for one trial.
    pub fn generate(&self, size: Size, seed: Seed) -> Tree<A> {
        self.args.generate(size, seed)
    }

    /// Evaluate the outcome for one argument value.
    pub fn evaluate(&self, args: &A) -> Outcome {
        (*self.test)(args)
    }
}

/// A property over one generated argument.
pub fn for_all<A, F>(gen: Gen<A>, predicate: F) -> Property<A>
where
    A: Clone + 'static,
    F: Fn(&A) -> bool + 'static,
{
    Property::new(gen, move |args| run_predicate(|| predicate(args)))
}

/// A property over two generated arguments. The first argument shrinks
/// preferentially.
pub fn for_all2<A, B, F>(first: Gen<A>, second: Gen<B>, predicate: F) -> Property<(A, B)>
where
    A: Clone + 'static,
    B: Clone + 'static,
    F: Fn(&A, &B) -> bool + 'static,
{
    Property::new(first.zip(second), move |args| {
        run_predicate(|| predicate(&args.0, &args.1))
    })
}

/// A property over three generated arguments, shrinking earlier arguments
/// first.
pub fn for_all3<A, B, C, F>(
    first: Gen<A>,
    second: Gen<B>,
    third: Gen<C>,
    predicate: F,
) -> Property<(A, B, C)>
where
    A: Clone + 'static,
    B: Clone + 'static,
    C: Clone + 'static,
    F: Fn(&A, &B, &C) -> bool + 'static,
{
    Property::new(first.zip3(second, third), move |args| {
        run_predicate(|| predicate(&args.0, &args.1, &args.2))
    })
}

fn run_predicate<F>(check: F) -> Outcome
where
    F: FnOnce() -> bool,
{
    match catch_unwind(AssertUnwindSafe(check)) {
        Ok(true) => Outcome::Passed,
        Ok(false) => Outcome::Failed,
        Err(payload) => Outcome::Errored(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "predicate panicked".to_string()
    }
}
