#![forbid(unsafe_code)]

//! Combinators over observable values.
//!
//! Every function here takes existing sources and returns a new derived value
//! (a [`Computed`](reactive::Computed) or, for [`concat`](concat::concat), an
//! [`ObservableVec`](reactive::ObservableVec)). Nothing is scheduled: the
//! derived values recompute lazily on the next read after a source changes.
//!
//! - [`object`]: null-safe mapping and widening casts.
//! - [`number`]: safe division, null-safe numeric coercion, NaN/∞ predicates.
//! - [`collection`]: min/max/average/sum, reduce, join.
//! - [`concat`]: an always-up-to-date concatenation of several vectors.

pub mod collection;
pub mod concat;
pub mod func;
pub mod number;
pub mod numeric;
pub mod object;

pub use bindery_reactive as reactive;

pub mod prelude {
    pub use crate::collection;
    pub use crate::concat::concat;
    pub use crate::func::{MapFn, ReduceFn};
    pub use crate::number::{self, Operand};
    pub use crate::numeric::{Number, NumberKind, ToNumber};
    pub use crate::object;
    pub use crate::reactive::{
        Computed, Dependency, ListChange, Observable, ObservableVec, Readable, Subscription,
    };
}
