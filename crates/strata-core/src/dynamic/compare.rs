//! Ordering and equality for `Dynamic`.
//!
//! `<` is only defined between values of the same kind. Equality never fails:
//! values of different kinds are simply unequal.

use std::cmp::Ordering;

use crate::error::{Error, Result};

use super::Dynamic;

impl Dynamic {
    /// Strict `<`. Fails for unordered maps and mismatched kinds.
    pub fn try_less(&self, other: &Dynamic) -> Result<bool> {
        use Dynamic::*;
        match (self, other) {
            (Null, Null) => Ok(false),
            (Bool(a), Bool(b)) => Ok(a < b),
            (Int(a), Int(b)) => Ok(a < b),
            (Double(a), Double(b)) => Ok(a < b),
            (String(a), String(b)) => Ok(a < b),
            (Array(a), Array(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    if x.try_less(y)? {
                        return Ok(true);
                    }
                    if y.try_less(x)? {
                        return Ok(false);
                    }
                }
                Ok(a.len() < b.len())
            }
            (Object(_), Object(_)) => Err(Error::TypeMismatch(
                "attempt to compare unordered maps".into(),
            )),
            (Ordered(a), Ordered(b)) => a.try_less(b),
            (Paired(a), Paired(b)) => a.try_less(b),
            _ => Err(Error::type_mismatch(
                "'<' comparison",
                self.kind().name(),
                other.kind().name(),
            )),
        }
    }

    pub fn try_greater(&self, other: &Dynamic) -> Result<bool> {
        other.try_less(self)
    }

    pub fn try_less_eq(&self, other: &Dynamic) -> Result<bool> {
        Ok(!other.try_less(self)?)
    }

    pub fn try_greater_eq(&self, other: &Dynamic) -> Result<bool> {
        Ok(!self.try_less(other)?)
    }

    /// Three-way comparison built on [`try_less`](Self::try_less).
    pub fn try_cmp(&self, other: &Dynamic) -> Result<Ordering> {
        if self.try_less(other)? {
            Ok(Ordering::Less)
        } else if other.try_less(self)? {
            Ok(Ordering::Greater)
        } else {
            Ok(Ordering::Equal)
        }
    }

    /// Total order over every value, for sorts and heaps that cannot fail.
    ///
    /// Values of different kinds order by [`Kind`]. Within a kind this
    /// follows [`try_cmp`](Self::try_cmp), except that doubles use the IEEE
    /// total order and unordered maps compare by their key-sorted entries.
    pub fn total_cmp(&self, other: &Dynamic) -> Ordering {
        use Dynamic::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Double(a), Double(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (Array(a), Array(b)) => lexicographic(a, b, Dynamic::total_cmp),
            (Object(a), Object(b)) => {
                let mut ea: Vec<_> = a.iter().collect();
                let mut eb: Vec<_> = b.iter().collect();
                ea.sort_unstable_by(|x, y| x.0.cmp(y.0));
                eb.sort_unstable_by(|x, y| x.0.cmp(y.0));
                lexicographic(&ea, &eb, |x, y| x.0.cmp(y.0).then_with(|| x.1.total_cmp(y.1)))
            }
            (Ordered(a), Ordered(b)) => a.total_cmp(b),
            (Paired(a), Paired(b)) => a.total_cmp(b),
            _ => self.kind().cmp(&other.kind()),
        }
    }
}

/// Element-wise order, a proper prefix first.
pub(super) fn lexicographic<T>(a: &[T], b: &[T], mut cmp: impl FnMut(&T, &T) -> Ordering) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| cmp(x, y))
        .find(|o| o.is_ne())
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

impl PartialEq for Dynamic {
    fn eq(&self, other: &Self) -> bool {
        use Dynamic::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Double(a), Double(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (Object(a), Object(b)) => a == b,
            (Ordered(a), Ordered(b)) => a == b,
            (Paired(a), Paired(b)) => a == b,
            _ => false,
        }
    }
}
