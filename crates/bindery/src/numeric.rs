#![forbid(unsafe_code)]

//! The closed set of numeric kinds the combinators understand.
//!
//! [`Number`] carries a value together with its kind so that arithmetic can
//! stay in the kind the caller chose (integer division truncates, float
//! division does not) and conversions between kinds are explicit.
//!
//! Conversion rules (`as_*`):
//!
//! | from \ to | `i32`          | `i64`          | `f32`    | `f64`  |
//! |-----------|----------------|----------------|----------|--------|
//! | `Int`     | exact          | exact          | rounded  | exact  |
//! | `Long`    | low 32 bits    | exact          | rounded  | rounded|
//! | `Float`   | saturating, NaN → 0 | saturating, NaN → 0 | exact | exact |
//! | `Double`  | saturating, NaN → 0 | saturating, NaN → 0 | rounded | exact |

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    Int,
    Long,
    Float,
    Double,
}

/// A number tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl Number {
    pub const ZERO: Number = Number::Int(0);

    #[must_use]
    pub const fn kind(self) -> NumberKind {
        match self {
            Self::Int(_) => NumberKind::Int,
            Self::Long(_) => NumberKind::Long,
            Self::Float(_) => NumberKind::Float,
            Self::Double(_) => NumberKind::Double,
        }
    }

    #[must_use]
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Int(v) => v,
            Self::Long(v) => v as i32,
            Self::Float(v) => v as i32,
            Self::Double(v) => v as i32,
        }
    }

    #[must_use]
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Int(v) => i64::from(v),
            Self::Long(v) => v,
            Self::Float(v) => v as i64,
            Self::Double(v) => v as i64,
        }
    }

    #[must_use]
    pub fn as_f32(self) -> f32 {
        match self {
            Self::Int(v) => v as f32,
            Self::Long(v) => v as f32,
            Self::Float(v) => v,
            Self::Double(v) => v as f32,
        }
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => f64::from(v),
            Self::Long(v) => v as f64,
            Self::Float(v) => f64::from(v),
            Self::Double(v) => v,
        }
    }
}

impl Default for Number {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
        }
    }
}

impl From<i32> for Number {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f32> for Number {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

/// Anything that can be viewed as a [`Number`].
pub trait ToNumber {
    fn to_number(&self) -> Number;

    fn to_f64(&self) -> f64 {
        self.to_number().as_f64()
    }
}

impl ToNumber for Number {
    fn to_number(&self) -> Number {
        *self
    }
}

macro_rules! to_number {
    ($variant:ident: $($ty:ty => $as:ty),* $(,)?) => {
        $(
            impl ToNumber for $ty {
                fn to_number(&self) -> Number {
                    Number::$variant(<$as>::from(*self))
                }
            }
        )*
    };
}

to_number!(Int: i8 => i32, i16 => i32, i32 => i32, u8 => i32, u16 => i32);
to_number!(Long: i64 => i64, u32 => i64);
to_number!(Float: f32 => f32);
to_number!(Double: f64 => f64);

impl<N: ToNumber + ?Sized> ToNumber for &N {
    fn to_number(&self) -> Number {
        (**self).to_number()
    }
}
