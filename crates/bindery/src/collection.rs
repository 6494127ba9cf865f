#![forbid(unsafe_code)]

//! Aggregates over observable vectors.
//!
//! Numeric aggregates read every element as `f64` (via [`ToNumber`]) and
//! produce a `Computed<f64>`. For `min`, `max` and `average` an empty vector
//! yields a default: either a fixed value or, for the `*_or_else` variants, a
//! producer that is called lazily, once per recomputation, and only when the
//! vector is empty. `sum` of an empty vector is `0.0`.
//!
//! Float semantics follow IEEE-754 with the usual aggregate conventions:
//!
//! - any NaN element makes `min`/`max` NaN;
//! - `-0.0` is smaller than `0.0` for `min`/`max`;
//! - `sum` and `average` use compensated (Kahan) summation, so long runs of
//!   decimal fractions do not drift.

use std::fmt::Display;

use bindery_reactive::{Computed, ObservableVec, Readable};

use crate::func::{MapFn, ReduceFn};
use crate::numeric::ToNumber;

fn min_of(values: &mut dyn Iterator<Item = f64>) -> Option<f64> {
    values.reduce(|a, b| {
        if a.is_nan() || b.is_nan() {
            f64::NAN
        } else if a == b {
            // Only differs for signed zeros.
            if a.is_sign_negative() { a } else { b }
        } else if a < b {
            a
        } else {
            b
        }
    })
}

fn max_of(values: &mut dyn Iterator<Item = f64>) -> Option<f64> {
    values.reduce(|a, b| {
        if a.is_nan() || b.is_nan() {
            f64::NAN
        } else if a == b {
            if a.is_sign_positive() { a } else { b }
        } else if a > b {
            a
        } else {
            b
        }
    })
}

/// Kahan compensated summation. Returns the sum and the element count.
fn compensated_sum(values: impl Iterator<Item = f64>) -> (f64, usize) {
    let mut sum = 0.0;
    let mut compensation = 0.0;
    let mut simple = 0.0;
    let mut count = 0;
    for value in values {
        count += 1;
        simple += value;
        let y = value - compensation;
        let t = sum + y;
        compensation = (t - sum) - y;
        sum = t;
    }
    // Infinities poison the compensation term with NaN; the naive sum has
    // the right answer in that case.
    if sum.is_nan() && simple.is_infinite() {
        (simple, count)
    } else {
        (sum, count)
    }
}

fn average_of(values: &mut dyn Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = compensated_sum(values);
    (count > 0).then(|| sum / count as f64)
}

fn aggregate<T, D>(
    numbers: &ObservableVec<T>,
    reduce: fn(&mut dyn Iterator<Item = f64>) -> Option<f64>,
    default: D,
) -> Computed<f64>
where
    T: ToNumber + Clone + 'static,
    D: Fn() -> f64 + 'static,
{
    Computed::from_source(numbers, move |items: &Vec<T>| {
        let mut values = items.iter().map(ToNumber::to_f64);
        reduce(&mut values).unwrap_or_else(&default)
    })
}

/// Smallest element, or `default` when empty.
pub fn min<T: ToNumber + Clone + 'static>(
    numbers: &ObservableVec<T>,
    default: impl ToNumber,
) -> Computed<f64> {
    let default = default.to_f64();
    aggregate(numbers, min_of, move || default)
}

/// Smallest element, or the producer's value when empty.
pub fn min_or_else<T, D>(
    numbers: &ObservableVec<T>,
    producer: impl Fn() -> D + 'static,
) -> Computed<f64>
where
    T: ToNumber + Clone + 'static,
    D: ToNumber,
{
    aggregate(numbers, min_of, move || producer().to_f64())
}

/// Largest element, or `default` when empty.
pub fn max<T: ToNumber + Clone + 'static>(
    numbers: &ObservableVec<T>,
    default: impl ToNumber,
) -> Computed<f64> {
    let default = default.to_f64();
    aggregate(numbers, max_of, move || default)
}

/// Largest element, or the producer's value when empty.
pub fn max_or_else<T, D>(
    numbers: &ObservableVec<T>,
    producer: impl Fn() -> D + 'static,
) -> Computed<f64>
where
    T: ToNumber + Clone + 'static,
    D: ToNumber,
{
    aggregate(numbers, max_of, move || producer().to_f64())
}

/// Arithmetic mean, or `default` when empty.
pub fn average<T: ToNumber + Clone + 'static>(
    numbers: &ObservableVec<T>,
    default: impl ToNumber,
) -> Computed<f64> {
    let default = default.to_f64();
    aggregate(numbers, average_of, move || default)
}

/// Arithmetic mean, or the producer's value when empty.
pub fn average_or_else<T, D>(
    numbers: &ObservableVec<T>,
    producer: impl Fn() -> D + 'static,
) -> Computed<f64>
where
    T: ToNumber + Clone + 'static,
    D: ToNumber,
{
    aggregate(numbers, average_of, move || producer().to_f64())
}

/// Sum of all elements; `0.0` when empty.
pub fn sum<T: ToNumber + Clone + 'static>(numbers: &ObservableVec<T>) -> Computed<f64> {
    Computed::from_source(numbers, |items: &Vec<T>| {
        compensated_sum(items.iter().map(ToNumber::to_f64)).0
    })
}

/// The items' `Display` forms joined by the current delimiter.
pub fn join<T>(items: &ObservableVec<T>, delimiter: &impl Readable<String>) -> Computed<String>
where
    T: Display + Clone + 'static,
{
    Computed::from2(items, delimiter, |items: &Vec<T>, delimiter: &String| {
        let mut joined = String::new();
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                joined.push_str(delimiter);
            }
            joined.push_str(&item.to_string());
        }
        joined
    })
}

fn fold<T: Clone>(items: &[T], reducer: &ReduceFn<T>) -> Option<T> {
    let (first, rest) = items.split_first()?;
    Some(
        rest.iter()
            .fold(first.clone(), |acc, next| reducer.apply(&acc, next)),
    )
}

/// Left fold of the items with the current reducer, or `default` when empty.
pub fn reduce<T>(
    items: &ObservableVec<T>,
    default: T,
    reducer: &impl Readable<ReduceFn<T>>,
) -> Computed<T>
where
    T: Clone + 'static,
{
    Computed::from2(items, reducer, move |items: &Vec<T>, reducer: &ReduceFn<T>| {
        fold(items, reducer).unwrap_or_else(|| default.clone())
    })
}

/// Left fold of the items with the current reducer, or the producer's value
/// when empty.
pub fn reduce_or_else<T>(
    items: &ObservableVec<T>,
    reducer: &impl Readable<ReduceFn<T>>,
    producer: impl Fn() -> T + 'static,
) -> Computed<T>
where
    T: Clone + 'static,
{
    Computed::from2(items, reducer, move |items: &Vec<T>, reducer: &ReduceFn<T>| {
        fold(items, reducer).unwrap_or_else(&producer)
    })
}

/// Like [`reduce`], then passes the result (or the default) through the
/// current mapper. Useful when the default only makes sense after mapping.
pub fn reduce_and_map<T, R>(
    items: &ObservableVec<T>,
    default: T,
    reducer: &impl Readable<ReduceFn<T>>,
    mapper: &impl Readable<MapFn<T, R>>,
) -> Computed<R>
where
    T: Clone + 'static,
    R: Clone + 'static,
{
    Computed::from3(
        items,
        reducer,
        mapper,
        move |items: &Vec<T>, reducer: &ReduceFn<T>, mapper: &MapFn<T, R>| {
            let folded = fold(items, reducer).unwrap_or_else(|| default.clone());
            mapper.apply(&folded)
        },
    )
}

/// Like [`reduce_or_else`], then passes the result through the current
/// mapper.
pub fn reduce_and_map_or_else<T, R>(
    items: &ObservableVec<T>,
    reducer: &impl Readable<ReduceFn<T>>,
    mapper: &impl Readable<MapFn<T, R>>,
    producer: impl Fn() -> T + 'static,
) -> Computed<R>
where
    T: Clone + 'static,
    R: Clone + 'static,
{
    Computed::from3(
        items,
        reducer,
        mapper,
        move |items: &Vec<T>, reducer: &ReduceFn<T>, mapper: &MapFn<T, R>| {
            let folded = fold(items, reducer).unwrap_or_else(&producer);
            mapper.apply(&folded)
        },
    )
}
