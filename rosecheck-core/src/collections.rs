//! Array, tuple, object, and unique-array generators.
//!
//! Collection shrinking tries removals first (one element or key at a
//! time, down to the length floor), then shrinks elements in place,
//! recursively. Tuples and fixed-length arrays never vary their length.

use std::collections::BTreeMap;

use crate::data::{Seed, Size};
use crate::gen::Gen;
use crate::tree::Tree;

/// Values that know when they are empty, for `not_empty`.
pub trait IsEmpty {
    fn is_empty_value(&self) -> bool;
}

impl<T> IsEmpty for Vec<T> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl IsEmpty for String {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<K: Ord, V> IsEmpty for BTreeMap<K, V> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T: IsEmpty + Clone + 'static> Gen<T> {
    /// Reject empty collections, with the usual retry escalation.
    pub fn not_empty(self) -> Gen<T> {
        self.such_that(|value| !value.is_empty_value())
    }
}

/// Combine element trees into a tree of vectors.
///
/// Children first remove one element at a time (while the length stays
/// above `min_len`), then substitute each element's own shrink candidates
/// in place. Both kinds recurse through `interleave` again, so removals
/// and element shrinks interleave freely during descent.
fn interleave<T: Clone + 'static>(trees: Vec<Tree<T>>, min_len: usize) -> Tree<Vec<T>> {
    let value: Vec<T> = trees.iter().map(|t| t.value.clone()).collect();
    Tree::with_children(value, move || {
        let mut kids = Vec::new();
        if trees.len() > min_len {
            for index in 0..trees.len() {
                let mut rest = trees.clone();
                rest.remove(index);
                kids.push(interleave(rest, min_len));
            }
        }
        for index in 0..trees.len() {
            for candidate in trees[index].children() {
                let mut next = trees.clone();
                next[index] = candidate;
                kids.push(interleave(next, min_len));
            }
        }
        kids
    })
}

/// Generate `count` element trees, each from an independent seed split.
fn draw_trees<T: Clone + 'static>(
    item: &Gen<T>,
    count: usize,
    size: Size,
    seed: Seed,
) -> Vec<Tree<T>> {
    let mut seed = seed;
    let mut trees = Vec::with_capacity(count);
    for _ in 0..count {
        let (item_seed, rest) = seed.split();
        seed = rest;
        trees.push(item.generate(size, item_seed));
    }
    trees
}

fn all_distinct<K: PartialEq>(keys: &[K]) -> bool {
    keys.iter()
        .enumerate()
        .all(|(i, key)| keys[i + 1..].iter().all(|other| other != key))
}

impl<T: Clone + 'static> Gen<Vec<T>> {
    /// Arrays of size-bounded random length.
    pub fn array(item: Gen<T>) -> Self {
        Gen::new(move |size, seed| {
            let (count, item_seed) = seed.next_bounded(size.get() as u64 + 1);
            interleave(draw_trees(&item, count as usize, size, item_seed), 0)
        })
    }

    /// Arrays of exactly `len` elements. Shrinking never changes the
    /// length, only the elements.
    pub fn array_len(item: Gen<T>, len: usize) -> Self {
        Gen::new(move |size, seed| interleave(draw_trees(&item, len, size, seed), len))
    }

    /// Arrays with length in `[min, max]`. Removal shrinks stop at `min`.
    pub fn array_within(item: Gen<T>, min: usize, max: usize) -> Self {
        assert!(min <= max, "array_within requires min <= max");
        Gen::new(move |size, seed| {
            let (extra, item_seed) = seed.next_bounded((max - min) as u64 + 1);
            let count = min + extra as usize;
            interleave(draw_trees(&item, count, size, item_seed), min)
        })
    }

    /// Fixed-arity arrays with one generator per slot. Shrinking varies
    /// slots individually and never the length.
    pub fn tuple(slots: Vec<Gen<T>>) -> Self {
        Gen::new(move |size, seed| {
            let mut seed = seed;
            let mut trees = Vec::with_capacity(slots.len());
            for slot in &slots {
                let (slot_seed, rest) = seed.split();
                seed = rest;
                trees.push(slot.generate(size, slot_seed));
            }
            let arity = trees.len();
            interleave(trees, arity)
        })
    }

    /// Arrays whose elements are pairwise distinct.
    pub fn unique_array(item: Gen<T>) -> Self
    where
        T: PartialEq,
    {
        Gen::unique_array_by(item, |value: &T| value.clone())
    }

    /// Arrays whose elements are pairwise distinct under `key`.
    ///
    /// Drawing retries until enough distinct elements appear or the
    /// attempt budget runs out; the requested length is a hint. Element
    /// shrinks that would collide are pruned.
    pub fn unique_array_by<K, F>(item: Gen<T>, key: F) -> Self
    where
        K: PartialEq + 'static,
        F: Fn(&T) -> K + Clone + 'static,
    {
        Gen::new(move |size, seed| {
            let (count, mut seed) = seed.next_bounded(size.get() as u64 + 1);
            let target = count as usize;
            let mut trees: Vec<Tree<T>> = Vec::with_capacity(target);
            let mut keys: Vec<K> = Vec::with_capacity(target);
            let mut attempts = 0;
            while trees.len() < target && attempts < 10 * (target + 1) {
                attempts += 1;
                let (item_seed, rest) = seed.split();
                seed = rest;
                let tree = item.generate(size, item_seed);
                let candidate = key(&tree.value);
                if keys.iter().all(|existing| *existing != candidate) {
                    keys.push(candidate);
                    trees.push(tree);
                }
            }
            let key = key.clone();
            interleave(trees, 0).prune(move |values| {
                let keys: Vec<K> = values.iter().map(&key).collect();
                all_distinct(&keys)
            })
        })
    }
}

/// Alpha-numeric object keys, up to 16 characters.
fn object_key() -> Gen<String> {
    Gen::alpha_num_string().scale(|size| Size::clamp(&size, 16))
}

impl<V: Clone + 'static> Gen<BTreeMap<String, V>> {
    /// Objects with alpha-numeric keys and values from `values`.
    pub fn object(values: Gen<V>) -> Self {
        Gen::object_with_keys(object_key(), values)
    }

    /// Objects with keys and values from the given generators.
    ///
    /// Keys are drawn distinct and do not shrink; shrinking removes keys
    /// one at a time, then shrinks values in place.
    pub fn object_with_keys(keys: Gen<String>, values: Gen<V>) -> Self {
        Gen::new(move |size, seed| {
            let (count, mut seed) = seed.next_bounded(size.get() as u64 + 1);
            let target = count as usize;
            let mut pairs: Vec<Tree<(String, V)>> = Vec::with_capacity(target);
            let mut seen: Vec<String> = Vec::with_capacity(target);
            let mut attempts = 0;
            while pairs.len() < target && attempts < 10 * (target + 1) {
                attempts += 1;
                let (key_seed, rest) = seed.split();
                seed = rest;
                let (value_seed, rest) = seed.split();
                seed = rest;
                let name = keys.generate(size, key_seed).value;
                if seen.contains(&name) {
                    continue;
                }
                seen.push(name.clone());
                let tree = values.generate(size, value_seed);
                pairs.push(tree.map(move |v| (name.clone(), v.clone())));
            }
            interleave(pairs, 0).map(|pairs| pairs.iter().cloned().collect())
        })
    }

    /// Objects with a fixed set of keys, one value generator per key.
    /// Shrinking varies values only; keys never disappear.
    pub fn object_shape(fields: Vec<(String, Gen<V>)>) -> Self {
        Gen::new(move |size, seed| {
            let mut seed = seed;
            let mut pairs = Vec::with_capacity(fields.len());
            for (name, gen) in &fields {
                let (field_seed, rest) = seed.split();
                seed = rest;
                let name = name.clone();
                pairs.push(
                    gen.generate(size, field_seed)
                        .map(move |v| (name.clone(), v.clone())),
                );
            }
            let arity = pairs.len();
            interleave(pairs, arity).map(|pairs| pairs.iter().cloned().collect())
        })
    }
}
