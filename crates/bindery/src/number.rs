#![forbid(unsafe_code)]

//! Numeric combinators: safe division, null-safe coercion, float predicates.
//!
//! # Safe division
//!
//! [`divide_safe`] and [`divide_safe_or`] accept each operand as an
//! [`Operand`]: a fixed value, an [`Observable`] or a [`Computed`]. The result
//! depends on every non-fixed operand, the default included. A zero divisor
//! yields the default instead of a fault or an infinity.
//!
//! Each numeric width keeps its own arithmetic ([`SafeDivision`]): `i32` and
//! `i64` truncate toward zero (and wrap on `MIN / -1`), `f32` and `f64` use
//! IEEE division. Operands are never widened across widths.
//!
//! [`Number`] operands may mix kinds. They are divided as `f64` and the
//! quotient is always [`Number::Double`], so a mixed `Int`/`Long` quotient
//! is not truncated.

use bindery_reactive::{Computed, Dependency, Observable, Readable};

use crate::numeric::{Number, ToNumber};

/// Per-width division semantics.
pub trait SafeDivision: Copy + PartialEq + 'static {
    /// The result of [`divide_safe`] when the divisor is zero.
    const ZERO: Self;

    fn is_zero(self) -> bool;

    /// `self / divisor`, for a divisor already known to be non-zero.
    fn quotient(self, divisor: Self) -> Self;
}

macro_rules! int_division {
    ($($ty:ty),*) => {
        $(
            impl SafeDivision for $ty {
                const ZERO: Self = 0;

                fn is_zero(self) -> bool {
                    self == 0
                }

                fn quotient(self, divisor: Self) -> Self {
                    self.wrapping_div(divisor)
                }
            }
        )*
    };
}

macro_rules! float_division {
    ($($ty:ty),*) => {
        $(
            impl SafeDivision for $ty {
                const ZERO: Self = 0.0;

                fn is_zero(self) -> bool {
                    self == 0.0
                }

                fn quotient(self, divisor: Self) -> Self {
                    self / divisor
                }
            }
        )*
    };
}

int_division!(i32, i64);
float_division!(f32, f64);

impl SafeDivision for Number {
    const ZERO: Self = Number::Double(0.0);

    fn is_zero(self) -> bool {
        self.as_f64() == 0.0
    }

    fn quotient(self, divisor: Self) -> Self {
        Number::Double(self.as_f64() / divisor.as_f64())
    }
}

/// One input of a numeric combinator: fixed, or read from a source.
#[derive(Debug, Clone)]
pub enum Operand<N> {
    Fixed(N),
    Observable(Observable<N>),
    Computed(Computed<N>),
}

impl<N: Clone + PartialEq + 'static> Operand<N> {
    /// The operand's current value.
    #[must_use]
    pub fn current(&self) -> N {
        match self {
            Self::Fixed(value) => value.clone(),
            Self::Observable(source) => source.get(),
            Self::Computed(source) => source.get(),
        }
    }

    /// The source to watch, if any.
    #[must_use]
    pub fn dependency(&self) -> Option<&dyn Dependency> {
        match self {
            Self::Fixed(_) => None,
            Self::Observable(source) => Some(source),
            Self::Computed(source) => Some(source),
        }
    }
}

macro_rules! fixed_operand {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Operand<$ty> {
                fn from(value: $ty) -> Self {
                    Self::Fixed(value)
                }
            }
        )*
    };
}

fixed_operand!(i32, i64, f32, f64, Number);

impl<N> From<Observable<N>> for Operand<N> {
    fn from(source: Observable<N>) -> Self {
        Self::Observable(source)
    }
}

impl<N> From<&Observable<N>> for Operand<N> {
    fn from(source: &Observable<N>) -> Self {
        Self::Observable(source.clone())
    }
}

impl<N> From<Computed<N>> for Operand<N> {
    fn from(source: Computed<N>) -> Self {
        Self::Computed(source)
    }
}

impl<N> From<&Computed<N>> for Operand<N> {
    fn from(source: &Computed<N>) -> Self {
        Self::Computed(source.clone())
    }
}

/// `dividend / divisor`, or zero when the divisor is zero.
pub fn divide_safe<N: SafeDivision>(
    dividend: impl Into<Operand<N>>,
    divisor: impl Into<Operand<N>>,
) -> Computed<N> {
    divide_safe_or(dividend, divisor, Operand::Fixed(N::ZERO))
}

/// `dividend / divisor`, or `default` when the divisor is zero.
pub fn divide_safe_or<N: SafeDivision>(
    dividend: impl Into<Operand<N>>,
    divisor: impl Into<Operand<N>>,
    default: impl Into<Operand<N>>,
) -> Computed<N> {
    let dividend = dividend.into();
    let divisor = divisor.into();
    let default = default.into();

    let dependencies: Vec<&dyn Dependency> = [&dividend, &divisor, &default]
        .into_iter()
        .filter_map(Operand::dependency)
        .collect();

    let (a, b, d) = (dividend.clone(), divisor.clone(), default.clone());
    Computed::new(
        move || {
            let divisor = b.current();
            if divisor.is_zero() {
                #[cfg(feature = "tracing")]
                tracing::trace!(message = "divide_safe.default");
                d.current()
            } else {
                a.current().quotient(divisor)
            }
        },
        &dependencies,
    )
}

fn coerce<N, T, A>(source: &A, project: fn(Number) -> T) -> Computed<T>
where
    N: ToNumber + 'static,
    T: Clone + 'static,
    A: Readable<Option<N>>,
{
    Computed::from_source(source, move |value: &Option<N>| {
        let number = value
            .as_ref()
            .map_or(Number::ZERO, ToNumber::to_number);
        project(number)
    })
}

/// The source as `i32`; absent reads as 0.
pub fn as_integer<N: ToNumber + 'static>(source: &impl Readable<Option<N>>) -> Computed<i32> {
    coerce(source, Number::as_i32)
}

/// The source as `i64`; absent reads as 0.
pub fn as_long<N: ToNumber + 'static>(source: &impl Readable<Option<N>>) -> Computed<i64> {
    coerce(source, Number::as_i64)
}

/// The source as `f32`; absent reads as 0.
pub fn as_float<N: ToNumber + 'static>(source: &impl Readable<Option<N>>) -> Computed<f32> {
    coerce(source, Number::as_f32)
}

/// The source as `f64`; absent reads as 0.
pub fn as_double<N: ToNumber + 'static>(source: &impl Readable<Option<N>>) -> Computed<f64> {
    coerce(source, Number::as_f64)
}

/// IEEE-754 classification for the float widths.
pub trait FloatValue: Copy + 'static {
    fn is_nan(self) -> bool;
    fn is_infinite(self) -> bool;
}

impl FloatValue for f32 {
    fn is_nan(self) -> bool {
        f32::is_nan(self)
    }

    fn is_infinite(self) -> bool {
        f32::is_infinite(self)
    }
}

impl FloatValue for f64 {
    fn is_nan(self) -> bool {
        f64::is_nan(self)
    }

    fn is_infinite(self) -> bool {
        f64::is_infinite(self)
    }
}

/// True while the source is NaN.
pub fn is_nan<F: FloatValue>(source: &impl Readable<F>) -> Computed<bool> {
    Computed::from_source(source, |value: &F| FloatValue::is_nan(*value))
}

/// True while the source is positive or negative infinity.
pub fn is_infinite<F: FloatValue>(source: &impl Readable<F>) -> Computed<bool> {
    Computed::from_source(source, |value: &F| FloatValue::is_infinite(*value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindery_reactive::Subscription;
    use std::cell::Cell;
    use std::rc::Rc;

    fn count_invalidations(source: &dyn Dependency) -> (Rc<Cell<u32>>, Subscription) {
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        let sub = source.on_invalidate(Rc::new(move || count_clone.set(count_clone.get() + 1)));
        (count, sub)
    }

    #[test]
    fn double_division_with_zero_default() {
        let a = Observable::new(0.0);
        let b = Observable::new(0.0);
        let quotient: Computed<f64> = divide_safe(&a, &b);

        assert_eq!(quotient.get(), 0.0);

        a.set(10.0);
        assert_eq!(quotient.get(), 0.0);

        b.set(5.0);
        assert_eq!(quotient.get(), 2.0);

        a.set(12.0);
        assert!((quotient.get() - 2.4).abs() < 1e-12);

        b.set(0.0);
        assert_eq!(quotient.get(), 0.0);
    }

    #[test]
    fn double_division_with_observable_default() {
        let a = Observable::new(0.0);
        let b = Observable::new(0.0);
        let default = Observable::new(3.2);
        let quotient: Computed<f64> = divide_safe_or(&a, &b, &default);

        assert_eq!(quotient.get(), 3.2);

        a.set(10.0);
        assert_eq!(quotient.get(), 3.2);

        b.set(5.0);
        assert_eq!(quotient.get(), 2.0);

        b.set(0.0);
        default.set(-1.0);
        assert_eq!(quotient.get(), -1.0);
    }

    #[test]
    fn integer_division_truncates() {
        let a = Observable::new(0);
        let b = Observable::new(0);
        let quotient: Computed<i32> = divide_safe(&a, &b);

        assert_eq!(quotient.get(), 0);

        a.set(10);
        b.set(5);
        assert_eq!(quotient.get(), 2);

        a.set(12);
        assert_eq!(quotient.get(), 2);

        a.set(-12);
        assert_eq!(quotient.get(), -2);

        b.set(0);
        assert_eq!(quotient.get(), 0);
    }

    #[test]
    fn integer_division_with_default() {
        let divisor = Observable::new(0);
        let quotient: Computed<i32> = divide_safe_or(12, &divisor, 10);
        assert_eq!(quotient.get(), 10);

        divisor.set(5);
        assert_eq!(quotient.get(), 2);
    }

    #[test]
    fn integer_overflow_wraps() {
        let quotient: Computed<i32> = divide_safe(i32::MIN, -1);
        assert_eq!(quotient.get(), i32::MIN);
        let quotient: Computed<i64> = divide_safe(i64::MIN, -1);
        assert_eq!(quotient.get(), i64::MIN);
    }

    #[test]
    fn fixed_divisor() {
        let dividend = Observable::new(9.0f32);
        let quotient: Computed<f32> = divide_safe(&dividend, 2.0f32);
        assert_eq!(quotient.get(), 4.5);
        dividend.set(1.0);
        assert_eq!(quotient.get(), 0.5);
    }

    #[test]
    fn negative_zero_divisor_counts_as_zero() {
        let quotient: Computed<f64> = divide_safe_or(1.0, -0.0, 7.0);
        assert_eq!(quotient.get(), 7.0);
    }

    #[test]
    fn computed_operands_chain() {
        let a = Observable::new(6);
        let doubled = Computed::from_source(&a, |v: &i32| v * 2);
        let quotient: Computed<i32> = divide_safe(&doubled, 4);
        assert_eq!(quotient.get(), 3);
        a.set(10);
        assert_eq!(quotient.get(), 5);
    }

    #[test]
    fn fixed_operands_have_no_dependencies() {
        let quotient: Computed<i64> = divide_safe(9i64, 3i64);
        assert_eq!(quotient.get(), 3);
        assert!(Operand::Fixed(1i64).dependency().is_none());
    }

    #[test]
    fn default_change_invalidates() {
        let b = Observable::new(0);
        let default = Observable::new(1);
        let quotient: Computed<i32> = divide_safe_or(5, &b, &default);
        let _ = quotient.get();
        let (count, _sub) = count_invalidations(&quotient);
        default.set(2);
        assert_eq!(count.get(), 1);
        assert_eq!(quotient.get(), 2);
    }

    #[test]
    fn mixed_number_kinds_divide_as_double() {
        let dividend = Observable::new(Number::Int(7));
        let divisor = Observable::new(Number::Long(0));
        let quotient: Computed<Number> = divide_safe(&dividend, &divisor);
        assert_eq!(quotient.get(), Number::Double(0.0));

        divisor.set(Number::Long(2));
        assert_eq!(quotient.get(), Number::Double(3.5));

        divisor.set(Number::Float(-0.0));
        assert_eq!(quotient.get(), Number::Double(0.0));

        let with_default: Computed<Number> =
            divide_safe_or(&dividend, Number::Int(0), Number::Int(-1));
        assert_eq!(with_default.get(), Number::Int(-1));
    }

    #[test]
    fn coercions_treat_absent_as_zero() {
        let source: Observable<Option<f64>> = Observable::new(None);
        let int = as_integer(&source);
        let long = as_long(&source);
        let float = as_float(&source);
        let double = as_double(&source);

        assert_eq!(int.get(), 0);
        assert_eq!(long.get(), 0);
        assert_eq!(float.get(), 0.0);
        assert_eq!(double.get(), 0.0);

        source.set(Some(12.75));
        assert_eq!(int.get(), 12);
        assert_eq!(long.get(), 12);
        assert_eq!(float.get(), 12.75);
        assert_eq!(double.get(), 12.75);
    }

    #[test]
    fn coercion_from_generic_number() {
        let source: Observable<Option<Number>> = Observable::new(Some(Number::Long(1 << 33 | 3)));
        assert_eq!(as_integer(&source).get(), 3);
        assert_eq!(as_long(&source).get(), (1 << 33) | 3);
    }

    #[test]
    fn nan_predicate() {
        let a = Observable::new(2.0);
        let b = Observable::new(4.0);
        let quotient = Computed::from2(&a, &b, |x: &f64, y: &f64| x / y);
        let nan = is_nan(&quotient);

        assert!(!nan.get());

        a.set(0.0);
        b.set(0.0);
        assert!(nan.get());
    }

    #[test]
    fn infinite_predicate() {
        let a = Observable::new(2.0);
        let b = Observable::new(4.0);
        let product = Computed::from2(&a, &b, |x: &f64, y: &f64| x * y);
        let infinite = is_infinite(&product);

        assert!(!infinite.get());

        b.set(f64::MAX);
        assert!(infinite.get());

        a.set(-2.0);
        assert!(infinite.get());
    }

    #[test]
    fn predicates_on_f32() {
        let source = Observable::new(f32::NAN);
        assert!(is_nan(&source).get());
        assert!(!is_infinite(&source).get());
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn zero_divisor_emits_trace_event() {
        use std::sync::{Arc, Mutex};
        use tracing_subscriber::Layer;
        use tracing_subscriber::layer::{Context, SubscriberExt};

        struct Capture(Arc<Mutex<Vec<String>>>);

        impl<S: tracing::Subscriber> Layer<S> for Capture {
            fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
                struct V(Option<String>);
                impl tracing::field::Visit for V {
                    fn record_debug(
                        &mut self,
                        field: &tracing::field::Field,
                        value: &dyn std::fmt::Debug,
                    ) {
                        if field.name() == "message" {
                            self.0 = Some(format!("{value:?}"));
                        }
                    }
                }
                let mut visitor = V(None);
                event.record(&mut visitor);
                if let Some(message) = visitor.0 {
                    self.0.lock().expect("capture lock").push(message);
                }
            }
        }

        let seen = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(Capture(Arc::clone(&seen)));
        tracing::subscriber::with_default(subscriber, || {
            let divisor = Observable::new(2);
            let quotient: Computed<i32> = divide_safe_or(8, &divisor, -1);
            assert_eq!(quotient.get(), 4);
            divisor.set(0);
            assert_eq!(quotient.get(), -1);
        });

        let seen = seen.lock().expect("capture lock");
        assert_eq!(
            seen.iter()
                .filter(|m| m.contains("divide_safe.default"))
                .count(),
            1
        );
    }
}
