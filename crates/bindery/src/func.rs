#![forbid(unsafe_code)]

//! Shared function handles that can live inside an [`Observable`].
//!
//! Closures are neither `Clone` nor `PartialEq`, so they cannot be stored in
//! an observable directly. [`ReduceFn`] and [`MapFn`] wrap one in an `Rc` and
//! compare by identity: setting an observable to a *different* handle
//! notifies, setting it to a clone of the current one does not.
//!
//! [`Observable`]: bindery_reactive::Observable

use std::fmt;
use std::rc::Rc;

/// A binary combining function `(acc, next) -> acc`.
pub struct ReduceFn<T> {
    f: Rc<dyn Fn(&T, &T) -> T>,
}

impl<T> ReduceFn<T> {
    pub fn new(f: impl Fn(&T, &T) -> T + 'static) -> Self {
        Self { f: Rc::new(f) }
    }

    pub fn apply(&self, acc: &T, next: &T) -> T {
        (self.f)(acc, next)
    }
}

impl<T> Clone for ReduceFn<T> {
    fn clone(&self) -> Self {
        Self {
            f: Rc::clone(&self.f),
        }
    }
}

impl<T> PartialEq for ReduceFn<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.f, &other.f)
    }
}

impl<T> fmt::Debug for ReduceFn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReduceFn")
            .field("ptr", &Rc::as_ptr(&self.f).cast::<()>())
            .finish()
    }
}

/// A unary mapping function `T -> R`.
pub struct MapFn<T, R> {
    f: Rc<dyn Fn(&T) -> R>,
}

impl<T, R> MapFn<T, R> {
    pub fn new(f: impl Fn(&T) -> R + 'static) -> Self {
        Self { f: Rc::new(f) }
    }

    pub fn apply(&self, value: &T) -> R {
        (self.f)(value)
    }
}

impl<T, R> Clone for MapFn<T, R> {
    fn clone(&self) -> Self {
        Self {
            f: Rc::clone(&self.f),
        }
    }
}

impl<T, R> PartialEq for MapFn<T, R> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.f, &other.f)
    }
}

impl<T, R> fmt::Debug for MapFn<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapFn")
            .field("ptr", &Rc::as_ptr(&self.f).cast::<()>())
            .finish()
    }
}
