/* ************************************************************************ **
** This file is part of rla, and is licensed under EITHER the MIT license   **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Approximate equality assertions for floats and containers of floats.
//!
//! ```
//! # #[macro_use] extern crate rla_assert_close;
//! # fn main() {
//! assert_close!(0.1 + 0.2, 0.3);
//! assert_close!(abs=1e-12, &[1.0, 0.0][..], &[1.0, 1e-14][..]);
//! assert_close!(rel=1e-3, abs=0.0, 1000.0, 1000.5, "{} != {}", "this", "that");
//! # }
//! ```

use ::failure::Fail;
use ::std::fmt;

/// Relative tolerance used when none is given.  The default absolute
/// tolerance is zero, so comparisons against exactly `0.0` need `abs=`.
pub const DEFAULT_NONZERO_TOL: f64 = 1e-9;

#[macro_export]
macro_rules! assert_close {
    ($($t:tt)*) => {
        $crate::__assert_close_impl!{
            @parsing [$($t)*] [[@rel $crate::DEFAULT_NONZERO_TOL] [@abs 0.0]]
        }
    };
}

#[macro_export]
macro_rules! debug_assert_close {
    ($($t:tt)*) => {{
        #[cfg(debug_assertions)] {
            $crate::assert_close!{$($t)*}
        }
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __assert_close_impl {
    (@parsing [rel=$tol:expr, $($rest:tt)*] [$($assignment:tt)*]) => {
        $crate::__assert_close_impl!(@parsing [$($rest)*] [$($assignment)* [@rel $tol]]);
    };
    (@parsing [abs=$tol:expr, $($rest:tt)*] [$($assignment:tt)*]) => {
        $crate::__assert_close_impl!(@parsing [$($rest)*] [$($assignment)* [@abs $tol]]);
    };
    (@parsing [$a:expr, $b:expr $(,)*] $assignments:tt) => {
        $crate::__assert_close_impl!(@expand $assignments [@comp $a, $b] [@fmt "not nearly equal!"])
    };
    (@parsing [$a:expr, $b:expr, $($fmt:tt)+] $assignments:tt) => {
        $crate::__assert_close_impl!(@expand $assignments [@comp $a, $b] [@fmt $($fmt)+])
    };
    (@expand [$($assignment:tt)*] [@comp $a:expr, $b:expr] [@fmt $($fmt:tt)+] ) => {
        #[allow(unused_mut)]
        #[allow(unused_assignments)]
        {
            let a = $a;
            let b = $b;

            let mut abs;
            let mut rel;
            $(
                $crate::__assert_close_impl!{@stmt::assign [abs, rel] $assignment}
            )*

            let tol = $crate::Tolerances { abs, rel };
            if let Err(e) = $crate::CheckClose::check_close(&a, &b, tol) {
                panic!(
                    "{} (tolerances: rel={}, abs={})\n left: {:?}\nright: {:?}\n{}",
                    format!($($fmt)+), rel, abs, a, b, e,
                );
            }
        }
    };
    (@stmt::assign [$abs:ident, $rel:ident] [@abs $tol:expr]) => { $abs = $tol; };
    (@stmt::assign [$abs:ident, $rel:ident] [@rel $tol:expr]) => { $rel = $tol; };
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tolerances {
    pub abs: f64,
    pub rel: f64,
}

/// `|a - b| <= max(abs, rel * max(|a|, |b|))`
///
/// Equal infinities are close; NaN is never close to anything.
pub fn is_close(a: f64, b: f64, Tolerances { abs, rel }: Tolerances) -> bool
{
    assert!(abs >= 0.0, "negative absolute tolerance: {}", abs);
    assert!(rel >= 0.0, "negative relative tolerance: {}", rel);

    if a == b {
        return true;
    }
    if !(a.is_finite() && b.is_finite()) {
        return false;
    }
    (a - b).abs() <= f64::max(abs, rel * f64::max(a.abs(), b.abs()))
}

/// Why two values were not close.
#[derive(Debug, Fail)]
pub enum CheckCloseError {
    /// Two scalars differed.  `index` locates them inside the outermost
    /// container (empty for bare scalars).
    #[fail(display = "first difference at {:?}: {:?} vs {:?}", index, left, right)]
    Values {
        index: Vec<usize>,
        left: f64,
        right: f64,
    },

    /// The containers could not even be compared.
    #[fail(display = "shape {:?} vs {:?}", left, right)]
    Shape {
        left: Vec<usize>,
        right: Vec<usize>,
    },
}

impl CheckCloseError {
    /// Record that this error occurred inside element `outer` of a container.
    pub fn within(self, outer: usize) -> Self
    {
        match self {
            CheckCloseError::Values { mut index, left, right } => {
                index.insert(0, outer);
                CheckCloseError::Values { index, left, right }
            },
            e => e,
        }
    }
}

pub trait CheckClose<Rhs: ?Sized = Self>: fmt::Debug {
    /// Test that every value in `self` is close to its counterpart in `other`,
    /// reporting the first one that isn't.
    fn check_close(&self, other: &Rhs, tol: Tolerances) -> Result<(), CheckCloseError>;
}

impl CheckClose for f64 {
    fn check_close(&self, other: &f64, tol: Tolerances) -> Result<(), CheckCloseError>
    {
        match is_close(*self, *other, tol) {
            true => Ok(()),
            false => Err(CheckCloseError::Values { index: vec![], left: *self, right: *other }),
        }
    }
}

impl<'a, T: ?Sized + CheckClose> CheckClose for &'a T {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError>
    { CheckClose::check_close(*self, *other, tol) }
}

impl<T: CheckClose> CheckClose for [T] {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError>
    {
        if self.len() != other.len() {
            return Err(CheckCloseError::Shape { left: vec![self.len()], right: vec![other.len()] });
        }
        for (i, (a, b)) in self.iter().zip(other).enumerate() {
            a.check_close(b, tol).map_err(|e| e.within(i))?;
        }
        Ok(())
    }
}

impl<T: CheckClose> CheckClose for Vec<T> {
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError>
    { self[..].check_close(&other[..], tol) }
}

impl<T: CheckClose> CheckClose<[T]> for Vec<T> {
    fn check_close(&self, other: &[T], tol: Tolerances) -> Result<(), CheckCloseError>
    { self[..].check_close(other, tol) }
}

impl<T: CheckClose> CheckClose<Vec<T>> for [T] {
    fn check_close(&self, other: &Vec<T>, tol: Tolerances) -> Result<(), CheckCloseError>
    { self.check_close(&other[..], tol) }
}

macro_rules! gen_array_impls {
    ($($n:tt)*) => {
        $(
        impl<T: CheckClose> CheckClose for [T; $n] {
            fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError>
            { self[..].check_close(&other[..], tol) }
        }
        )*
    };
}

gen_array_impls! {
    0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16
}
