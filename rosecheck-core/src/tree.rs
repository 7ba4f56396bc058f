//! Lazy rose tree representing a value and its shrink candidates.

use std::fmt;
use std::rc::Rc;

type Thunk<T> = Rc<dyn Fn() -> Vec<Tree<T>>>;

/// A rose tree with an eager root value and lazily computed children.
///
/// Children are ordered from the most aggressive shrink to the least, and
/// live behind a thunk: forcing one level of the tree never materializes
/// the levels below it. Trees are immutable; combinators build new trees
/// that share structure through reference-counted thunks.
pub struct Tree<T> {
    pub value: T,
    children: Thunk<T>,
}

impl<T: Clone> Clone for Tree<T> {
    fn clone(&self) -> Self {
        Tree {
            value: self.value.clone(),
            children: Rc::clone(&self.children),
        }
    }
}

impl<T> Tree<T> {
    /// A tree with no shrinks.
    pub fn leaf(value: T) -> Self
    where
        T: 'static,
    {
        Tree {
            value,
            children: Rc::new(Vec::new),
        }
    }

    /// A tree whose children are produced on demand by `children_fn`.
    pub fn with_children<F>(value: T, children_fn: F) -> Self
    where
        F: Fn() -> Vec<Tree<T>> + 'static,
    {
        Tree {
            value,
            children: Rc::new(children_fn),
        }
    }

    /// Force one level of the tree.
    pub fn children(&self) -> Vec<Tree<T>>
    where
        T: Clone,
    {
        (*self.children)()
    }

    /// Whether forcing the tree yields any shrink candidates.
    pub fn has_shrinks(&self) -> bool
    where
        T: Clone,
    {
        !self.children().is_empty()
    }
}

impl<T: Clone + 'static> Tree<T> {
    /// Grow a tree from a value and a shrink step.
    ///
    /// Each node's children are the shrink candidates of its value, each
    /// recursively unfolded with the same step. The step must produce
    /// strictly smaller values so that descent terminates.
    pub fn unfold<F>(value: T, shrink: F) -> Self
    where
        F: Fn(&T) -> Vec<T> + Clone + 'static,
    {
        let root = value.clone();
        Tree {
            value,
            children: Rc::new(move || {
                shrink(&root)
                    .into_iter()
                    .map(|candidate| Tree::unfold(candidate, shrink.clone()))
                    .collect()
            }),
        }
    }

    /// Apply `f` to every value in the tree, lazily below the root.
    ///
    /// The shrink structure is preserved exactly; the underlying generator
    /// is never re-invoked.
    pub fn map<U, F>(&self, f: F) -> Tree<U>
    where
        U: Clone + 'static,
        F: Fn(&T) -> U + Clone + 'static,
    {
        let value = f(&self.value);
        let children = Rc::clone(&self.children);
        Tree {
            value,
            children: Rc::new(move || (*children)().iter().map(|c| c.map(f.clone())).collect()),
        }
    }

    /// Keep the root but drop any descendant whose value fails `predicate`.
    ///
    /// Subtrees are pruned, not replaced: a rejected child takes its whole
    /// subtree with it.
    pub fn prune<F>(&self, predicate: F) -> Tree<T>
    where
        F: Fn(&T) -> bool + Clone + 'static,
    {
        let children = Rc::clone(&self.children);
        Tree {
            value: self.value.clone(),
            children: Rc::new(move || {
                (*children)()
                    .into_iter()
                    .filter(|c| predicate(&c.value))
                    .map(|c| c.prune(predicate.clone()))
                    .collect()
            }),
        }
    }

    /// Pair two trees so that each child varies exactly one side.
    ///
    /// Children shrink the left tree first, holding the right at its
    /// current value, then the right; recursively. This ordering is what
    /// gives earlier property arguments shrink priority.
    pub fn zip<U>(&self, other: &Tree<U>) -> Tree<(T, U)>
    where
        U: Clone + 'static,
    {
        let left = self.clone();
        let right = other.clone();
        Tree {
            value: (left.value.clone(), right.value.clone()),
            children: Rc::new(move || {
                let mut pairs: Vec<Tree<(T, U)>> =
                    left.children().iter().map(|c| c.zip(&right)).collect();
                pairs.extend(right.children().iter().map(|c| left.zip(c)));
                pairs
            }),
        }
    }

    /// Collect the values of the tree down to `max_depth` levels, forcing
    /// as it goes. Test and debugging aid.
    pub fn expand(&self, max_depth: usize) -> Vec<T> {
        let mut out = vec![self.value.clone()];
        if max_depth > 0 {
            for child in self.children() {
                out.extend(child.expand(max_depth - 1));
            }
        }
        out
    }
}

impl<T: fmt::Debug> fmt::Debug for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn leaf_has_no_children() {
        let tree = Tree::leaf(42);
        assert_eq!(tree.value, 42);
        assert!(!tree.has_shrinks());
    }

    #[test]
    fn children_are_not_forced_on_construction() {
        let forced = Rc::new(Cell::new(false));
        let flag = Rc::clone(&forced);
        let tree = Tree::with_children(1, move || {
            flag.set(true);
            vec![Tree::leaf(0)]
        });
        assert!(!forced.get());
        assert_eq!(tree.children().len(), 1);
        assert!(forced.get());
    }

    #[test]
    fn unfold_terminates_and_orders_candidates() {
        let tree = Tree::unfold(4, |&n: &i64| (0..n).rev().collect());
        let kids = tree.children();
        let roots: Vec<i64> = kids.iter().map(|t| t.value).collect();
        assert_eq!(roots, vec![3, 2, 1, 0]);
        assert!(kids[3].children().is_empty());
    }

    #[test]
    fn map_preserves_structure_lazily() {
        let forced = Rc::new(Cell::new(0));
        let count = Rc::clone(&forced);
        let tree = Tree::with_children(3, move || {
            count.set(count.get() + 1);
            vec![Tree::leaf(1), Tree::leaf(0)]
        });
        let doubled = tree.map(|n| n * 2);
        assert_eq!(doubled.value, 6);
        assert_eq!(forced.get(), 0);
        let roots: Vec<i32> = doubled.children().iter().map(|t| t.value).collect();
        assert_eq!(roots, vec![2, 0]);
    }

    #[test]
    fn prune_drops_whole_subtrees() {
        let tree = Tree::with_children(10, || {
            vec![
                Tree::with_children(4, || vec![Tree::leaf(2)]),
                Tree::with_children(5, || vec![Tree::leaf(1)]),
            ]
        });
        let even = tree.prune(|n| n % 2 == 0);
        let roots: Vec<i32> = even.children().iter().map(|t| t.value).collect();
        assert_eq!(roots, vec![4]);
        let grand: Vec<i32> = even.children()[0].children().iter().map(|t| t.value).collect();
        assert_eq!(grand, vec![2]);
    }

    #[test]
    fn zip_varies_one_side_at_a_time() {
        let left = Tree::with_children(2, || vec![Tree::leaf(1)]);
        let right = Tree::with_children(20, || vec![Tree::leaf(10)]);
        let pair = left.zip(&right);
        assert_eq!(pair.value, (2, 20));
        let roots: Vec<(i32, i32)> = pair.children().iter().map(|t| t.value).collect();
        assert_eq!(roots, vec![(1, 20), (2, 10)]);
    }

    #[test]
    fn expand_walks_to_depth() {
        let tree = Tree::unfold(2, |&n: &i64| if n > 0 { vec![n - 1] } else { vec![] });
        assert_eq!(tree.expand(0), vec![2]);
        assert_eq!(tree.expand(2), vec![2, 1, 0]);
    }
}
