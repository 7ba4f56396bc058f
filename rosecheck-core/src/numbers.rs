//! Integer and floating-point generators.
//!
//! Numeric shrinking halves the distance to an origin (the in-range value
//! closest to zero) at each step, so descent is logarithmic in magnitude
//! rather than linear.

use crate::data::Size;
use crate::gen::Gen;
use crate::tree::Tree;

/// Shrink candidates for `target`, ordered most aggressive first: the
/// origin itself, then values closing half the remaining distance.
fn towards(origin: i64, target: i64) -> Vec<i64> {
    if origin == target {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut delta = target as i128 - origin as i128;
    while delta != 0 {
        out.push((target as i128 - delta) as i64);
        delta /= 2;
    }
    out
}

/// Float shrink candidates: the origin, then halving steps down to unit
/// granularity. Stopping at unit steps keeps descent finite.
fn towards_f64(origin: f64, target: f64) -> Vec<f64> {
    if origin == target {
        return Vec::new();
    }
    let mut out = vec![origin];
    let mut delta = (target - origin) / 2.0;
    while delta.abs() >= 1.0 {
        out.push(target - delta);
        delta /= 2.0;
    }
    out
}

impl Gen<i64> {
    /// Generate an integer in `[min, max]`, inclusive.
    ///
    /// Shrinks toward the in-range value closest to zero, so every
    /// candidate stays within bounds.
    pub fn int_within(min: i64, max: i64) -> Self {
        assert!(min <= max, "int_within requires min <= max");
        let origin = 0i64.clamp(min, max);
        Gen::new(move |_size, seed| {
            let span = (max as i128 - min as i128 + 1) as u128;
            let (draw, _) = if span > u64::MAX as u128 {
                seed.next_u64()
            } else {
                seed.next_bounded(span as u64)
            };
            let value = (min as i128 + draw as i128) as i64;
            Tree::unfold(value, move |&v| towards(origin, v))
        })
    }

    /// Generate integers roughly in `[-size, size]`.
    pub fn int() -> Self {
        Gen::sized(|size| {
            let bound = size.get() as i64;
            Gen::int_within(-bound, bound)
        })
    }

    /// Nonnegative integers, roughly in `[0, size]`.
    pub fn pos_int() -> Self {
        Gen::sized(|size| Gen::int_within(0, size.get() as i64))
    }

    /// Nonpositive integers, roughly in `[-size, 0]`.
    pub fn neg_int() -> Self {
        Gen::sized(|size| Gen::int_within(-(size.get() as i64), 0))
    }

    /// Strictly positive integers.
    pub fn strict_pos_int() -> Self {
        Gen::sized(|size| Gen::int_within(1, (size.get() as i64).max(1)))
    }

    /// Strictly negative integers.
    pub fn strict_neg_int() -> Self {
        Gen::sized(|size| Gen::int_within((-(size.get() as i64)).min(-1), -1))
    }
}

impl Gen<f64> {
    /// Generate a float in `[min, max]`.
    pub fn number_within(min: f64, max: f64) -> Self {
        assert!(
            min <= max && min.is_finite() && max.is_finite(),
            "number_within requires finite min <= max"
        );
        let origin = 0f64.clamp(min, max);
        Gen::new(move |_size, seed| {
            let (unit, _) = seed.next_f64();
            let value = min + unit * (max - min);
            Tree::unfold(value, move |&v| towards_f64(origin, v))
        })
    }

    /// Generate floats roughly in `[-size, size]`.
    pub fn number() -> Self {
        Gen::sized(|size| {
            let bound = size.get() as f64;
            Gen::number_within(-bound, bound)
        })
    }

    /// Nonnegative floats, roughly in `[0, size]`.
    pub fn pos_number() -> Self {
        Gen::sized(|size| Gen::number_within(0.0, size.get() as f64))
    }

    /// Nonpositive floats, roughly in `[-size, 0]`.
    pub fn neg_number() -> Self {
        Gen::sized(|size| Gen::number_within(-(size.get() as f64), 0.0))
    }

    /// Always NaN. Not shrinkable.
    pub fn nan() -> Self {
        Gen::new(|_size, _seed| Tree::leaf(f64::NAN))
    }
}
