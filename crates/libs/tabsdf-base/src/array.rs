//! Utilities for ordered sequences of numbers, mostly the angle axes of a
//! [`SampleGrid`](crate::grid::SampleGrid).
//!
//! All functions expect ascending sequences; none of them check it.

use num_traits::Float;

/// Tolerance used to compare two samples of an axis.
pub const AXIS_TOLERANCE: f64 = 1e-5;

#[inline(always)]
fn float<F: Float>(n: usize) -> F {
    // Never `None` for floating point types.
    F::from(n).unwrap_or_else(F::nan)
}

/// Equality test tolerant to the rounding errors accumulated while building
/// an axis.
pub fn is_equal<F: Float>(a: F, b: F) -> bool {
    match (a.to_f64(), b.to_f64()) {
        (Some(a), Some(b)) => approx::relative_eq!(
            a,
            b,
            epsilon = AXIS_TOLERANCE,
            max_relative = AXIS_TOLERANCE
        ),
        _ => false,
    }
}

/// Creates `n` evenly spaced values from `start` to `stop` (both included).
///
/// With `n == 1` the sequence only contains `start`.
pub fn linspace<F: Float>(n: usize, start: F, stop: F) -> Vec<F> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / float::<F>(n - 1);
            (0..n)
                .map(|i| {
                    if i == n - 1 {
                        stop
                    } else {
                        start + step * float(i)
                    }
                })
                .collect()
        },
    }
}

/// Creates a non-equal interval sequence from zero to `max_value`.
///
/// The sequence starts as a linear one, then every interior value is warped
/// by raising its relative position to `exponent`. An exponent greater than
/// one concentrates the samples near zero.
pub fn create_exponential<F: Float>(n: usize, max_value: F, exponent: F) -> Vec<F> {
    let mut values = linspace(n, F::zero(), max_value);
    if n > 2 {
        for v in values[1..n - 1].iter_mut() {
            let ratio = (*v / max_value).powf(exponent);
            *v = ratio * max_value;
        }
    }
    values
}

/// Returns true if the values are `0, d, 2d, ..., (n - 1)d`.
///
/// Sequences with two elements or fewer are never considered equal interval.
pub fn is_equal_interval<F: Float>(values: &[F]) -> bool {
    let n = values.len();
    if n <= 2 {
        return false;
    }

    let interval = values[n - 1] / float::<F>(n - 1);
    values
        .iter()
        .enumerate()
        .all(|(i, &v)| is_equal(v, interval * float(i)))
}

/// Returns the position of the first value equal to `value` (within
/// [`AXIS_TOLERANCE`]).
pub fn position_of<F: Float>(values: &[F], value: F) -> Option<usize> {
    values.iter().position(|&v| is_equal(v, value))
}

/// Returns true if a value of the sequence is within `epsilon` of `value`.
pub fn contains_value<F: Float>(values: &[F], value: F, epsilon: F) -> bool {
    values.iter().any(|&v| (v - value).abs() <= epsilon)
}

/// Returns a copy of the sequence with `value` appended.
pub fn append_element<F: Copy>(values: &[F], value: F) -> Vec<F> {
    let mut appended = Vec::with_capacity(values.len() + 1);
    appended.extend_from_slice(values);
    appended.push(value);
    appended
}

/// Neighbouring samples of a value inside a sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds<F> {
    /// Index of the sample at the lower bound.
    pub lower_index: usize,
    /// Index of the sample at the upper bound.
    pub upper_index: usize,
    /// Value of the sample at the lower bound.
    pub lower_value: F,
    /// Value of the sample at the upper bound.
    pub upper_value: F,
}

impl<F: Float> Bounds<F> {
    /// Linear interpolation weight of the upper sample for `value`.
    ///
    /// Values outside of the bounds give weights outside of [0, 1], which
    /// extrapolates linearly. Degenerate bounds give 0.
    pub fn weight(&self, value: F) -> F {
        let span = self.upper_value - self.lower_value;
        if span == F::zero() {
            F::zero()
        } else {
            (value - self.lower_value) / span
        }
    }
}

/// Finds the neighbouring samples of `value`.
///
/// If `value` is out of the range of the sequence, the two nearest samples at
/// the boundary are returned so that the caller can extrapolate. A sequence
/// of a single element gives the same index for both bounds.
///
/// With `equal_interval` (see [`is_equal_interval`]) the bounds are found by a
/// division instead of a binary search.
///
/// # Panics
///
/// Panics if `values` is empty.
pub fn find_bounds<F: Float>(values: &[F], value: F, equal_interval: bool) -> Bounds<F> {
    assert!(!values.is_empty(), "Can't find bounds in an empty sequence");
    let n = values.len();

    let (lower_index, upper_index) = if n == 1 {
        (0, 0)
    } else if value <= values[0] {
        (0, 1)
    } else if value >= values[n - 1] {
        (n - 2, n - 1)
    } else if equal_interval {
        let interval = values[n - 1] / float::<F>(n - 1);
        let lower = (value / interval)
            .floor()
            .to_usize()
            .unwrap_or(0)
            .min(n - 2);
        (lower, lower + 1)
    } else {
        let upper = values.partition_point(|&v| v <= value).clamp(1, n - 1);
        (upper - 1, upper)
    };

    Bounds {
        lower_index,
        upper_index,
        lower_value: values[lower_index],
        upper_value: values[upper_index],
    }
}

/// Finds the neighbouring samples of `value` on a circular axis of the given
/// `period`.
///
/// `value` is first wrapped into `[0, period)`. When it falls into the gap
/// between the last sample and the first sample of the next period, the
/// bounds are the last and the first sample, the upper value being shifted by
/// one period.
///
/// Returns the bounds and the (possibly shifted) query to use with
/// [`Bounds::weight`].
pub fn find_bounds_periodic<F: Float>(values: &[F], value: F, period: F) -> (Bounds<F>, F) {
    assert!(!values.is_empty(), "Can't find bounds in an empty sequence");
    let n = values.len();
    let mut wrapped = value % period;
    if wrapped < F::zero() {
        wrapped = wrapped + period;
    }

    if n == 1 {
        return (find_bounds(values, wrapped, false), wrapped);
    }

    let first = values[0];
    let last = values[n - 1];
    let query = if wrapped < first {
        wrapped + period
    } else {
        wrapped
    };

    if query >= first && query <= last {
        return (find_bounds(values, query, false), query);
    }

    (
        Bounds {
            lower_index: n - 1,
            upper_index: 0,
            lower_value: last,
            upper_value: first + period,
        },
        query,
    )
}
