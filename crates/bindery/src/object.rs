#![forbid(unsafe_code)]

//! Null-safe mapping and widening casts over arbitrary values.

use bindery_reactive::{Computed, Readable};

/// Map a possibly-absent value. The function is only called when a value is
/// present; an absent source maps to `None`.
pub fn map<S, R>(
    source: &impl Readable<Option<S>>,
    function: impl Fn(&S) -> R + 'static,
) -> Computed<Option<R>>
where
    S: 'static,
    R: Clone + 'static,
{
    Computed::from_source(source, move |value: &Option<S>| value.as_ref().map(&function))
}

/// Map a possibly-absent value, substituting `default` when it is absent.
pub fn map_or<S, R>(
    source: &impl Readable<Option<S>>,
    default: R,
    function: impl Fn(&S) -> R + 'static,
) -> Computed<R>
where
    S: 'static,
    R: Clone + 'static,
{
    Computed::from_source(source, move |value: &Option<S>| match value {
        Some(value) => function(value),
        None => default.clone(),
    })
}

/// View a source at a wider type.
pub fn cast<S, T>(source: &impl Readable<S>) -> Computed<T>
where
    S: Clone + Into<T> + 'static,
    T: Clone + 'static,
{
    Computed::from_source(source, |value: &S| value.clone().into())
}
