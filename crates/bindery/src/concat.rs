#![forbid(unsafe_code)]

//! Live concatenation of observable vectors.
//!
//! # Design
//!
//! [`concat`] returns a fresh [`ObservableVec`] and subscribes to every
//! source. Whatever a source reports (insert, remove, replace, reset) and
//! whichever source reports it, the output is rebuilt from scratch:
//! cleared and refilled with every source's items, in source order, through a
//! single [`replace_all`](ObservableVec::replace_all).
//!
//! Consequences callers can rely on:
//!
//! - listeners on the output see one [`ListChange::Reset`] per source change,
//!   never fine-grained inserts or removals, and they see it even when the
//!   net contents did not change;
//! - each rebuild costs O(total items);
//! - a source passed twice is watched twice, so each of its changes rebuilds
//!   twice;
//! - writes made directly to the output survive only until the next source
//!   change;
//! - a source notifies its listeners in registration order, so a listener
//!   registered on a source *before* `concat` was called still sees the
//!   output from before the rebuild. Subscribe to the output itself to
//!   observe the rebuilt contents.
//!
//! The output owns the source subscriptions (the sources only hold weak
//! references to them), so dropping every handle to the output detaches it.
//!
//! [`ListChange::Reset`]: bindery_reactive::ListChange::Reset

use std::rc::Rc;

use bindery_reactive::ObservableVec;

/// Concatenate `sources` into one vector that tracks them.
///
/// The set of sources is fixed; only their contents may change. With no
/// sources the result is an empty vector nothing will ever write to.
#[must_use]
pub fn concat<T: Clone + 'static>(sources: &[&ObservableVec<T>]) -> ObservableVec<T> {
    let sources: Rc<[ObservableVec<T>]> = sources.iter().map(|s| (*s).clone()).collect();
    let output = ObservableVec::from_vec(flatten(&sources));
    if sources.is_empty() {
        return output;
    }

    for source in sources.iter() {
        let weak_output = output.downgrade();
        let all = Rc::clone(&sources);
        let sub = source.subscribe(move |_change| {
            if let Some(output) = weak_output.upgrade() {
                rebuild(&output, &all);
            }
        });
        output.retain_subscription(sub);
    }

    output
}

fn flatten<T: Clone + 'static>(sources: &[ObservableVec<T>]) -> Vec<T> {
    let total = sources.iter().map(ObservableVec::len).sum();
    let mut items = Vec::with_capacity(total);
    for source in sources {
        source.with(|slice| items.extend_from_slice(slice));
    }
    items
}

fn rebuild<T: Clone + 'static>(output: &ObservableVec<T>, sources: &[ObservableVec<T>]) {
    let items = flatten(sources);
    #[cfg(feature = "tracing")]
    tracing::debug!(
        message = "concat.rebuild",
        sources = sources.len(),
        len = items.len()
    );
    output.replace_all(items);
}
