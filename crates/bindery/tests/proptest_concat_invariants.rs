//! Property-based invariant tests for the combinators.
//!
//! 1. `concat` equals the flattened sources after every interleaved mutation.
//! 2. The output only ever reports `Reset`, at most one per source change.
//! 3. `divide_safe_or` equals the quotient for non-zero divisors and the
//!    default for zero, across divisor transitions.
//! 4. `sum` of integers equals the exact integer sum; empty `min`/`max`/
//!    `average` equal their defaults.
//! 5. `join` equals `Vec::join` of the display forms.

use std::cell::Cell;
use std::rc::Rc;

use bindery::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Mutation {
    Push(usize, u8),
    Remove(usize, usize),
    Clear(usize),
    Replace(usize, Vec<u8>),
}

fn mutation(sources: usize) -> impl Strategy<Value = Mutation> {
    prop_oneof![
        4 => (0..sources, any::<u8>()).prop_map(|(s, v)| Mutation::Push(s, v)),
        2 => (0..sources, 0usize..8).prop_map(|(s, i)| Mutation::Remove(s, i)),
        1 => (0..sources).prop_map(Mutation::Clear),
        1 => (0..sources, proptest::collection::vec(any::<u8>(), 0..5))
            .prop_map(|(s, items)| Mutation::Replace(s, items)),
    ]
}

/// Apply a mutation; returns whether the source actually changed.
fn apply(sources: &[ObservableVec<u8>], m: &Mutation) -> bool {
    let before: u64 = sources.iter().map(ObservableVec::version).sum();
    match m {
        Mutation::Push(s, v) => sources[*s].push(*v),
        Mutation::Remove(s, i) => {
            let _ = sources[*s].remove(*i);
        }
        Mutation::Clear(s) => sources[*s].clear(),
        Mutation::Replace(s, items) => sources[*s].replace_all(items.iter().copied()),
    }
    let after: u64 = sources.iter().map(ObservableVec::version).sum();
    after != before
}

fn flattened(sources: &[ObservableVec<u8>]) -> Vec<u8> {
    sources.iter().flat_map(ObservableVec::to_vec).collect()
}

proptest! {
    #[test]
    fn concat_equals_flattened_sources(
        initial in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..4), 1..4),
        mutations in proptest::collection::vec(mutation(3), 0..48),
    ) {
        let sources: Vec<ObservableVec<u8>> =
            initial.into_iter().map(ObservableVec::from_vec).collect();
        let refs: Vec<&ObservableVec<u8>> = sources.iter().collect();
        let joined = concat(&refs);
        prop_assert_eq!(joined.to_vec(), flattened(&sources));

        for m in mutations.iter().filter(|m| source_index(m) < sources.len()) {
            apply(&sources, m);
            prop_assert_eq!(joined.to_vec(), flattened(&sources));
        }
    }

    #[test]
    fn one_reset_per_source_change(
        mutations in proptest::collection::vec(mutation(2), 0..32),
    ) {
        let sources: Vec<ObservableVec<u8>> = vec![ObservableVec::new(), ObservableVec::new()];
        let joined = concat(&[&sources[0], &sources[1]]);
        let resets = Rc::new(Cell::new(0u32));
        let resets_clone = Rc::clone(&resets);
        let _sub = joined.subscribe(move |change| {
            assert!(matches!(change, ListChange::Reset { .. }));
            resets_clone.set(resets_clone.get() + 1);
        });

        let mut changes = 0u32;
        for m in &mutations {
            if apply(&sources, m) {
                changes += 1;
            }
        }
        // A rebuild from empty to empty is silent.
        prop_assert!(resets.get() <= changes);
        prop_assert_eq!(joined.to_vec(), flattened(&sources));
    }

    #[test]
    fn safe_divide_tracks_divisor(
        dividend in -1000i32..1000,
        default in any::<i32>(),
        divisors in proptest::collection::vec(-5i32..5, 1..20),
    ) {
        let divisor = Observable::new(divisors[0]);
        let quotient: Computed<i32> = number::divide_safe_or(dividend, &divisor, default);
        for d in divisors {
            divisor.set(d);
            let expected = if d == 0 { default } else { dividend / d };
            prop_assert_eq!(quotient.get(), expected);
        }
    }

    #[test]
    fn float_safe_divide_never_faults(
        dividend in -1e6f64..1e6,
        divisor in prop_oneof![Just(0.0f64), Just(-0.0f64), -1e6f64..1e6],
    ) {
        let quotient: Computed<f64> = number::divide_safe_or(dividend, divisor, 42.0);
        if divisor == 0.0 {
            prop_assert_eq!(quotient.get(), 42.0);
        } else {
            prop_assert_eq!(quotient.get(), dividend / divisor);
        }
    }

    #[test]
    fn integer_sum_is_exact(values in proptest::collection::vec(-10_000i32..10_000, 0..64)) {
        let numbers = ObservableVec::from_vec(values.clone());
        let total = collection::sum(&numbers);
        let expected: i64 = values.iter().map(|v| i64::from(*v)).sum();
        prop_assert_eq!(total.get(), expected as f64);
    }

    #[test]
    fn min_max_match_iterators(values in proptest::collection::vec(-10_000i32..10_000, 0..64)) {
        let numbers = ObservableVec::from_vec(values.clone());
        let lo = collection::min(&numbers, -0.5);
        let hi = collection::max(&numbers, 0.5);
        let expected_lo = values.iter().min().map_or(-0.5, |v| f64::from(*v));
        let expected_hi = values.iter().max().map_or(0.5, |v| f64::from(*v));
        prop_assert_eq!(lo.get(), expected_lo);
        prop_assert_eq!(hi.get(), expected_hi);
    }

    #[test]
    fn join_matches_std(
        words in proptest::collection::vec("[a-z]{0,4}", 0..8),
        delimiter in "[,;|]{0,2}",
    ) {
        let items = ObservableVec::from_vec(words.clone());
        let delim = Observable::new(delimiter.clone());
        let joined = collection::join(&items, &delim);
        prop_assert_eq!(joined.get(), words.join(delimiter.as_str()));
    }
}

fn source_index(m: &Mutation) -> usize {
    match m {
        Mutation::Push(s, _)
        | Mutation::Remove(s, _)
        | Mutation::Clear(s)
        | Mutation::Replace(s, _) => *s,
    }
}
