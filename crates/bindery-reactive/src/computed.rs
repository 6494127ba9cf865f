#![forbid(unsafe_code)]

//! Lazy computed values that auto-update from their dependencies.
//!
//! # Design
//!
//! [`Computed<T>`] wraps a compute function and its cached result in shared,
//! reference-counted storage. When any dependency changes, the cached value is
//! invalidated (marked dirty). The next call to [`get()`](Computed::get)
//! recomputes and caches the result.
//!
//! A `Computed` is itself a [`Dependency`]: on the clean → dirty transition it
//! notifies its own invalidation listeners, so derived values can be chained.
//! A value that is already dirty does not notify again; whoever depends on it
//! is dirty too until it reads the value.
//!
//! # Invariants
//!
//! 1. `get()` always returns a value consistent with the current state of all
//!    dependencies (no stale reads after a dependency mutation completes).
//! 2. The compute function is called at most once per dependency change cycle
//!    (memoization).
//! 3. If no dependency has changed, `get()` returns the cached value in O(1).
//! 4. Version increments by exactly 1 per recomputation.
//!
//! # Failure Modes
//!
//! - **Compute function panics**: The cached value remains from the last
//!   successful computation. The dirty flag stays set so the next `get()` will
//!   retry.
//! - **Compute function reads its own `Computed`**: [`try_get()`](Computed::try_get)
//!   reports [`ReactiveError::CyclicRead`]; `get()` panics.
//! - **Dependency dropped**: If the source is dropped, the subscription
//!   becomes inert. The computed value retains its last cached result and
//!   never becomes dirty again from that source.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::{ReactiveError, Result};
use crate::observable::Subscription;
use crate::source::{Dependency, Readable};

/// Shared interior for [`Computed<T>`].
struct ComputedInner<T> {
    /// The computation function.
    compute: Box<dyn Fn() -> T>,
    /// Cached result (None only before first computation).
    cached: RefCell<Option<T>>,
    /// Whether the cached value is stale.
    dirty: Cell<bool>,
    /// Set while `compute` runs; a second refresh in that window is a cycle.
    computing: Cell<bool>,
    /// Monotonically increasing version, bumped on each recomputation.
    version: Cell<u64>,
    /// Callbacks fired on the clean -> dirty transition.
    listeners: RefCell<Vec<Weak<dyn Fn()>>>,
    /// Subscription guards keeping dependency callbacks alive.
    /// These are never read after construction, but must be kept alive.
    _subscriptions: RefCell<Vec<Subscription>>,
}

impl<T> ComputedInner<T> {
    fn mark_dirty(&self) {
        if self.dirty.replace(true) {
            return;
        }
        let listeners: Vec<Rc<dyn Fn()>> = {
            let mut listeners = self.listeners.borrow_mut();
            listeners.retain(|weak| weak.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };
        for listener in listeners {
            listener();
        }
    }
}

/// Clears `computing` when a recomputation ends, and leaves the value dirty
/// if it ended by unwinding.
struct RecomputeGuard<'a> {
    computing: &'a Cell<bool>,
    dirty: &'a Cell<bool>,
    finished: bool,
}

impl Drop for RecomputeGuard<'_> {
    fn drop(&mut self) {
        self.computing.set(false);
        if !self.finished {
            self.dirty.set(true);
        }
    }
}

/// A lazily-evaluated, memoized value derived from one or more
/// [`Dependency`] sources.
///
/// Cloning a `Computed` creates a new handle to the **same** inner state.
///
/// # Invariants
///
/// 1. `dirty` is true after any dependency changes and before `get()`.
/// 2. `version` increments by 1 on each recomputation.
/// 3. The compute function is called only when `dirty` is true and `get()`
///    is called.
pub struct Computed<T> {
    inner: Rc<ComputedInner<T>>,
}

impl<T> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Computed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Computed")
            .field("cached", &self.inner.cached.borrow())
            .field("dirty", &self.inner.dirty.get())
            .field("version", &self.inner.version.get())
            .finish()
    }
}

impl<T: Clone + 'static> Computed<T> {
    /// Create a computed value from a compute function and the sources it
    /// reads.
    ///
    /// Any change to any of `dependencies` marks the value dirty. The compute
    /// function is free to read sources that are not listed, but changes to
    /// those will not trigger recomputation.
    pub fn new(compute: impl Fn() -> T + 'static, dependencies: &[&dyn Dependency]) -> Self {
        let inner = Rc::new(ComputedInner {
            compute: Box::new(compute),
            cached: RefCell::new(None),
            dirty: Cell::new(true), // Computed on first get().
            computing: Cell::new(false),
            version: Cell::new(0),
            listeners: RefCell::new(Vec::new()),
            _subscriptions: RefCell::new(Vec::with_capacity(dependencies.len())),
        });

        for dependency in dependencies {
            let weak_inner = Rc::downgrade(&inner);
            let sub = dependency.on_invalidate(Rc::new(move || {
                if let Some(strong) = weak_inner.upgrade() {
                    strong.mark_dirty();
                }
            }));
            inner._subscriptions.borrow_mut().push(sub);
        }

        Self { inner }
    }

    /// Create a computed value derived from a single source.
    ///
    /// The `map` function receives a reference to the source value and
    /// returns the derived value.
    pub fn from_source<S, A>(source: &A, map: impl Fn(&S) -> T + 'static) -> Self
    where
        A: Readable<S>,
    {
        let source_clone = source.clone();
        Self::new(move || source_clone.with_value(|v| map(v)), &[source])
    }

    /// Create a computed value derived from two sources.
    pub fn from2<S1, S2, A1, A2>(s1: &A1, s2: &A2, map: impl Fn(&S1, &S2) -> T + 'static) -> Self
    where
        A1: Readable<S1>,
        A2: Readable<S2>,
    {
        let s1_clone = s1.clone();
        let s2_clone = s2.clone();
        Self::new(
            move || s1_clone.with_value(|v1| s2_clone.with_value(|v2| map(v1, v2))),
            &[s1, s2],
        )
    }

    /// Create a computed value derived from three sources.
    pub fn from3<S1, S2, S3, A1, A2, A3>(
        s1: &A1,
        s2: &A2,
        s3: &A3,
        map: impl Fn(&S1, &S2, &S3) -> T + 'static,
    ) -> Self
    where
        A1: Readable<S1>,
        A2: Readable<S2>,
        A3: Readable<S3>,
    {
        let s1_clone = s1.clone();
        let s2_clone = s2.clone();
        let s3_clone = s3.clone();
        Self::new(
            move || {
                s1_clone.with_value(|v1| {
                    s2_clone.with_value(|v2| s3_clone.with_value(|v3| map(v1, v2, v3)))
                })
            },
            &[s1, s2, s3],
        )
    }

    fn refresh(&self) -> Result<()> {
        let inner = &*self.inner;
        if inner.computing.get() {
            return Err(ReactiveError::CyclicRead);
        }
        if !inner.dirty.get() {
            return Ok(());
        }
        inner.computing.set(true);
        // Cleared up front so that an invalidation arriving while `compute`
        // runs leaves the value dirty again.
        inner.dirty.set(false);
        let mut guard = RecomputeGuard {
            computing: &inner.computing,
            dirty: &inner.dirty,
            finished: false,
        };
        let new_value = (inner.compute)();
        guard.finished = true;
        drop(guard);

        *inner.cached.borrow_mut() = Some(new_value);
        let version = inner.version.get() + 1;
        inner.version.set(version);
        #[cfg(feature = "tracing")]
        tracing::trace!(message = "computed.recompute", version);
        Ok(())
    }

    /// Get the current value, recomputing if any dependency has changed.
    ///
    /// # Panics
    ///
    /// Panics if called from inside this value's own compute function. Use
    /// [`try_get`](Self::try_get) to observe that case as an error.
    #[must_use]
    pub fn get(&self) -> T {
        match self.try_get() {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Get the current value, recomputing if any dependency has changed.
    ///
    /// Returns [`ReactiveError::CyclicRead`] when called from inside this
    /// value's own compute function.
    pub fn try_get(&self) -> Result<T> {
        self.try_with(T::clone)
    }

    /// Access the current value by reference without cloning.
    ///
    /// Forces recomputation if dirty. The closure receives an immutable
    /// reference to the cached value.
    ///
    /// # Panics
    ///
    /// Panics on a cyclic read, or if the closure forces a recomputation of
    /// the same `Computed` (re-entrant borrow).
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        match self.try_with(f) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    fn try_with<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        self.refresh()?;
        let cached = self.inner.cached.borrow();
        Ok(f(cached
            .as_ref()
            .expect("cached is always Some after refresh")))
    }

    /// Whether the cached value is stale.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.get()
    }

    /// Force invalidation of the cached value. The next `get()` will
    /// recompute.
    pub fn invalidate(&self) {
        self.inner.mark_dirty();
    }

    /// Current version number. Increments by 1 on each recomputation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    pub(crate) fn add_invalidation_listener(&self, listener: Rc<dyn Fn()>) -> Subscription {
        let mut listeners = self.inner.listeners.borrow_mut();
        listeners.retain(|weak| weak.strong_count() > 0);
        listeners.push(Rc::downgrade(&listener));
        drop(listeners);
        Subscription::new(listener)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
