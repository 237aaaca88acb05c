//! Value traits the typed matchers of [`Until`](crate::Until) are bounded on.

use std::collections::VecDeque;
use std::rc::Rc;

use smallvec::SmallVec;

/// Loose truthiness: zero, empty text, `false`, `NaN` and `None` are falsy.
///
/// Sequences do not implement it, so `to_be_truthy` is not offered on
/// sequence sources. Wait on their contents with `to_contains` or `to_match`.
pub trait Truthy {
    fn is_truthy(&self) -> bool;
}

impl Truthy for bool {
    fn is_truthy(&self) -> bool {
        *self
    }
}

macro_rules! truthy_int {
    ($($t:ty),*) => {
        $(impl Truthy for $t {
            fn is_truthy(&self) -> bool {
                *self != 0
            }
        })*
    };
}

truthy_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl Truthy for f32 {
    fn is_truthy(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }
}

impl Truthy for f64 {
    fn is_truthy(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }
}

impl Truthy for String {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for &str {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl<T: Truthy> Truthy for Option<T> {
    fn is_truthy(&self) -> bool {
        self.as_ref().is_some_and(Truthy::is_truthy)
    }
}

/// Floating point values that can hold `NaN`.
pub trait NotANumber {
    fn is_not_a_number(&self) -> bool;
}

impl NotANumber for f32 {
    fn is_not_a_number(&self) -> bool {
        self.is_nan()
    }
}

impl NotANumber for f64 {
    fn is_not_a_number(&self) -> bool {
        self.is_nan()
    }
}

/// Collections `to_contains` can search.
pub trait Sequence {
    type Item;

    fn contains_item(&self, item: &Self::Item) -> bool;
}

impl<E: PartialEq> Sequence for Vec<E> {
    type Item = E;

    fn contains_item(&self, item: &E) -> bool {
        self.contains(item)
    }
}

impl<E: PartialEq> Sequence for VecDeque<E> {
    type Item = E;

    fn contains_item(&self, item: &E) -> bool {
        self.contains(item)
    }
}

impl<E: PartialEq, const N: usize> Sequence for [E; N] {
    type Item = E;

    fn contains_item(&self, item: &E) -> bool {
        self.contains(item)
    }
}

impl<E: PartialEq> Sequence for Rc<[E]> {
    type Item = E;

    fn contains_item(&self, item: &E) -> bool {
        self.contains(item)
    }
}

impl<A: smallvec::Array> Sequence for SmallVec<A>
where
    A::Item: PartialEq,
{
    type Item = A::Item;

    fn contains_item(&self, item: &A::Item) -> bool {
        self.contains(item)
    }
}
