#![forbid(unsafe_code)]

//! Reactive primitives for bindery.
//!
//! This crate provides the change-tracking layer the bindery combinators are
//! built on:
//!
//! - [`Observable`]: A shared, version-tracked value wrapper with change
//!   notification via subscriber callbacks.
//! - [`ObservableVec`]: A shared, ordered vector that reports structural
//!   changes as [`ListChange`] events.
//! - [`Subscription`]: RAII guard that automatically unsubscribes on drop.
//! - [`Computed`]: A lazily-evaluated, memoized value derived from one or
//!   more dependencies.
//! - [`Dependency`] / [`Readable`]: The seams that let a [`Computed`] watch any
//!   of the above, including another [`Computed`].
//!
//! # Architecture
//!
//! Everything is single-threaded: shared state lives in `Rc<RefCell<..>>`.
//! Subscribers are stored as `Weak` function pointers and cleaned up lazily
//! on the next notification or subscription. No borrow is held while callbacks run, so a callback
//! may read the value that notified it.
//!
//! `Computed<T>` subscribes to its sources through [`Dependency`], marking
//! itself dirty on change. Recomputation is deferred until `get()`.
//!
//! # Invariants
//!
//! 1. Version increments exactly once per mutation that changes the value.
//! 2. Subscribers are notified in registration order.
//! 3. Setting a value equal to the current value is a no-op (no version bump,
//!    no notifications).
//! 4. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.
//! 5. `Computed::get()` never returns a stale value.

pub mod computed;
pub mod error;
pub mod list;
pub mod observable;
pub mod source;

pub use computed::Computed;
pub use error::{ReactiveError, Result};
pub use list::{ListChange, ObservableVec, WeakObservableVec};
pub use observable::{Observable, Subscription};
pub use source::{Dependency, Readable};
