#![forbid(unsafe_code)]

//! Observable vectors with structural change notification.
//!
//! # Design
//!
//! [`ObservableVec<T>`] mirrors [`Observable`](crate::Observable): one
//! `Rc<RefCell<..>>` holding the items, a version counter and `Weak`
//! subscriber callbacks. Every mutation that changes the contents bumps the
//! version once and emits exactly one [`ListChange`] after the borrow has
//! been released.
//!
//! A vector can also own [`Subscription`]s to *other* sources
//! ([`retain_subscription`](ObservableVec::retain_subscription)). Derived
//! vectors use this so their upstream wiring lives exactly as long as they do.
//!
//! # Invariants
//!
//! 1. Mutations that leave the contents untouched (clearing an empty vector,
//!    extending with nothing, retaining everything) emit nothing.
//! 2. `version()` increments by exactly 1 per emitted change.

use std::cell::RefCell;
use std::fmt;
use std::ops::Range;
use std::rc::{Rc, Weak};

use crate::error::{ReactiveError, Result};
use crate::observable::Subscription;

/// What happened to an [`ObservableVec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListChange {
    /// Items were inserted at `range`.
    Inserted { range: Range<usize> },
    /// `count` items were removed starting at `index`.
    Removed { index: usize, count: usize },
    /// The item at `index` was replaced.
    Replaced { index: usize },
    /// The whole contents were swapped out.
    Reset { old_len: usize, new_len: usize },
}

type Listener = dyn Fn(&ListChange);

struct ListInner<T> {
    items: Vec<T>,
    version: u64,
    listeners: Vec<Weak<Listener>>,
    retained: Vec<Subscription>,
}

/// A shared, ordered, mutable vector that reports its changes.
///
/// Cloning an `ObservableVec` creates a new handle to the **same** vector.
pub struct ObservableVec<T> {
    inner: Rc<RefCell<ListInner<T>>>,
}

/// Non-owning handle to an [`ObservableVec`].
pub struct WeakObservableVec<T> {
    inner: Weak<RefCell<ListInner<T>>>,
}

impl<T> Clone for ObservableVec<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Clone for WeakObservableVec<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> WeakObservableVec<T> {
    /// Recover a strong handle if the vector is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<ObservableVec<T>> {
        self.inner.upgrade().map(|inner| ObservableVec { inner })
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ObservableVec")
            .field("items", &inner.items)
            .field("version", &inner.version)
            .finish()
    }
}

impl<T: Clone + 'static> Default for ObservableVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> FromIterator<T> for ObservableVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T: Clone + 'static> ObservableVec<T> {
    /// Create an empty vector.
    #[must_use]
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Create a vector holding `items`, at version 0.
    #[must_use]
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ListInner {
                items,
                version: 0,
                listeners: Vec::new(),
                retained: Vec::new(),
            })),
        }
    }

    /// Create a non-owning handle.
    #[must_use]
    pub fn downgrade(&self) -> WeakObservableVec<T> {
        WeakObservableVec {
            inner: Rc::downgrade(&self.inner),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().items.is_empty()
    }

    /// Clone out the item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.inner.borrow().items.get(index).cloned()
    }

    /// Clone out the whole contents.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.borrow().items.clone()
    }

    /// Access the contents as a slice.
    ///
    /// # Panics
    ///
    /// Panics if the closure mutates this vector (re-entrant borrow).
    pub fn with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.inner.borrow().items)
    }

    pub(crate) fn with_vec<R>(&self, f: impl FnOnce(&Vec<T>) -> R) -> R {
        f(&self.inner.borrow().items)
    }

    /// Number of emitted changes so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    pub fn push(&self, item: T) {
        let index = {
            let mut inner = self.inner.borrow_mut();
            inner.items.push(item);
            inner.items.len() - 1
        };
        self.emit(ListChange::Inserted {
            range: index..index + 1,
        });
    }

    /// Append every item of `items`, as a single change.
    pub fn extend(&self, items: impl IntoIterator<Item = T>) {
        let range = {
            let mut inner = self.inner.borrow_mut();
            let start = inner.items.len();
            inner.items.extend(items);
            start..inner.items.len()
        };
        if !range.is_empty() {
            self.emit(ListChange::Inserted { range });
        }
    }

    pub fn insert(&self, index: usize, item: T) -> Result<()> {
        {
            let mut inner = self.inner.borrow_mut();
            let len = inner.items.len();
            if index > len {
                return Err(ReactiveError::out_of_bounds(index, len));
            }
            inner.items.insert(index, item);
        }
        self.emit(ListChange::Inserted {
            range: index..index + 1,
        });
        Ok(())
    }

    pub fn remove(&self, index: usize) -> Result<T> {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            let len = inner.items.len();
            if index >= len {
                return Err(ReactiveError::out_of_bounds(index, len));
            }
            inner.items.remove(index)
        };
        self.emit(ListChange::Removed { index, count: 1 });
        Ok(removed)
    }

    /// Replace the item at `index`, returning the previous one.
    pub fn set(&self, index: usize, item: T) -> Result<T> {
        let previous = {
            let mut inner = self.inner.borrow_mut();
            let len = inner.items.len();
            let Some(slot) = inner.items.get_mut(index) else {
                return Err(ReactiveError::out_of_bounds(index, len));
            };
            std::mem::replace(slot, item)
        };
        self.emit(ListChange::Replaced { index });
        Ok(previous)
    }

    pub fn clear(&self) {
        let count = {
            let mut inner = self.inner.borrow_mut();
            let count = inner.items.len();
            inner.items.clear();
            count
        };
        if count > 0 {
            self.emit(ListChange::Removed { index: 0, count });
        }
    }

    /// Keep only the items matching `keep`. Emits a single `Reset` if
    /// anything was dropped.
    pub fn retain(&self, keep: impl FnMut(&T) -> bool) {
        let (old_len, new_len) = {
            let mut inner = self.inner.borrow_mut();
            let old_len = inner.items.len();
            inner.items.retain(keep);
            (old_len, inner.items.len())
        };
        if old_len != new_len {
            self.emit(ListChange::Reset { old_len, new_len });
        }
    }

    /// Swap the whole contents for `items`, as a single `Reset`.
    ///
    /// The change is emitted even when the new contents equal the old ones;
    /// only replacing an empty vector with nothing is silent.
    pub fn replace_all(&self, items: impl IntoIterator<Item = T>) {
        let (old_len, new_len) = {
            let mut inner = self.inner.borrow_mut();
            let old_len = inner.items.len();
            inner.items.clear();
            inner.items.extend(items);
            (old_len, inner.items.len())
        };
        if old_len == 0 && new_len == 0 {
            return;
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(message = "observable_vec.reset", old_len, new_len);
        self.emit(ListChange::Reset { old_len, new_len });
    }

    /// Register a callback invoked with every change.
    pub fn subscribe(&self, callback: impl Fn(&ListChange) + 'static) -> Subscription {
        let callback: Rc<Listener> = Rc::new(callback);
        let mut inner = self.inner.borrow_mut();
        inner.listeners.retain(|weak| weak.strong_count() > 0);
        inner.listeners.push(Rc::downgrade(&callback));
        drop(inner);
        Subscription::new(callback)
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .listeners
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    /// Keep `subscription` alive for as long as this vector exists.
    pub fn retain_subscription(&self, subscription: Subscription) {
        self.inner.borrow_mut().retained.push(subscription);
    }

    fn emit(&self, change: ListChange) {
        let listeners = {
            let mut inner = self.inner.borrow_mut();
            inner.version += 1;
            inner.listeners.retain(|weak| weak.strong_count() > 0);
            inner
                .listeners
                .iter()
                .filter_map(Weak::upgrade)
                .collect::<Vec<_>>()
        };
        for listener in listeners {
            listener(&change);
        }
    }
}

impl<T: Clone + PartialEq + 'static> ObservableVec<T> {
    /// Remove the first item equal to `item`. Returns whether one was found.
    pub fn remove_item(&self, item: &T) -> bool {
        let position = self.inner.borrow().items.iter().position(|x| x == item);
        match position {
            Some(index) => self.remove(index).is_ok(),
            None => false,
        }
    }

    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.inner.borrow().items.contains(item)
    }
}
