#![forbid(unsafe_code)]

//! Traits shared by everything a [`Computed`](crate::Computed) can watch.
//!
//! [`Dependency`] is the object-safe half: "tell me when you change". It is
//! what [`Computed::new`](crate::Computed::new) accepts as a slice of sources.
//! [`Readable`] adds typed read access and is what the typed constructors
//! (`from_source`, `from2`, `from3`) and the bindery combinators take.

use std::rc::Rc;

use crate::computed::Computed;
use crate::list::ObservableVec;
use crate::observable::{Observable, Subscription};

/// A source of invalidation events.
pub trait Dependency {
    /// Register `callback` to run whenever this source changes (or, for a
    /// [`Computed`], becomes dirty). The callback stays registered while the
    /// returned [`Subscription`] is alive.
    fn on_invalidate(&self, callback: Rc<dyn Fn()>) -> Subscription;
}

/// A [`Dependency`] whose current value can be read as a `T`.
pub trait Readable<T>: Dependency + Clone + 'static {
    /// Run `f` against the current value.
    fn with_value<R>(&self, f: impl FnOnce(&T) -> R) -> R;

    /// Clone out the current value.
    fn value(&self) -> T
    where
        T: Clone,
    {
        self.with_value(T::clone)
    }
}

impl<T: Clone + PartialEq + 'static> Dependency for Observable<T> {
    fn on_invalidate(&self, callback: Rc<dyn Fn()>) -> Subscription {
        self.subscribe(move |_| callback())
    }
}

impl<T: Clone + PartialEq + 'static> Readable<T> for Observable<T> {
    fn with_value<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.with(f)
    }
}

impl<T: Clone + 'static> Dependency for ObservableVec<T> {
    fn on_invalidate(&self, callback: Rc<dyn Fn()>) -> Subscription {
        self.subscribe(move |_| callback())
    }
}

impl<T: Clone + 'static> Readable<Vec<T>> for ObservableVec<T> {
    fn with_value<R>(&self, f: impl FnOnce(&Vec<T>) -> R) -> R {
        self.with_vec(f)
    }
}

impl<T: Clone + 'static> Dependency for Computed<T> {
    fn on_invalidate(&self, callback: Rc<dyn Fn()>) -> Subscription {
        self.add_invalidation_listener(callback)
    }
}

impl<T: Clone + 'static> Readable<T> for Computed<T> {
    fn with_value<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.with(f)
    }
}
