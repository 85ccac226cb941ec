//! Arithmetic-style combination: append (`+=`), multiply and map merge.

use crate::error::{Error, Result};

use super::{Dynamic, Kind};

impl Dynamic {
    /// In-place `+=`.
    ///
    /// Numbers sum (mixed int/double widens to double), strings and vectors
    /// concatenate, and a non-vector right side is pushed onto a vector.
    pub fn append(&mut self, other: Dynamic) -> Result<()> {
        use Dynamic::*;
        let lhs = std::mem::take(self);
        *self = match (lhs, other) {
            (Int(a), Int(b)) => Int(a.wrapping_add(b)),
            (Double(a), Double(b)) => Double(a + b),
            (Double(a), Int(b)) => Double(a + b as f64),
            (Int(a), Double(b)) => Double(a as f64 + b),
            (String(mut a), String(b)) => {
                a.push_str(&b);
                String(a)
            }
            (Array(mut a), Array(b)) => {
                a.extend(b);
                Array(a)
            }
            (Array(mut a), b) => {
                a.push(b);
                Array(a)
            }
            (lhs, b) => {
                let err = Error::type_mismatch("can't append", lhs.kind().name(), b.kind().name());
                *self = lhs;
                return Err(err);
            }
        };
        Ok(())
    }

    /// Numeric product, or dot product of two equally sized vectors.
    pub fn mul(&self, other: &Dynamic) -> Result<Dynamic> {
        use Dynamic::*;
        match (self, other) {
            (Int(a), Int(b)) => Ok(Int(a.wrapping_mul(*b))),
            (Double(a), Double(b)) => Ok(Double(a * b)),
            (Int(a), Double(b)) => Ok(Double(*a as f64 * b)),
            (Double(a), Int(b)) => Ok(Double(a * *b as f64)),
            (Array(a), Array(b)) => {
                if a.len() != b.len() {
                    return Err(Error::TypeMismatch(format!(
                        "dot product of vectors with sizes {} and {}",
                        a.len(),
                        b.len()
                    )));
                }
                let mut products = a.iter().zip(b.iter()).map(|(x, y)| x.mul(y));
                let mut acc = match products.next() {
                    Some(first) => first?,
                    None => return Ok(Double(0.0)),
                };
                for p in products {
                    acc.append(p?)?;
                }
                Ok(acc)
            }
            _ => Err(Error::type_mismatch(
                "'*'",
                self.kind().name(),
                other.kind().name(),
            )),
        }
    }

    /// Fold a map-shaped `other` into `self`.
    ///
    /// New keys are inserted. On a collision an existing map value is first
    /// wrapped into a one-element vector, then the incoming value is appended,
    /// so repeated nested records accumulate into a list while numbers sum.
    pub fn merge(&mut self, other: &Dynamic) -> Result<()> {
        let result = self.merge_entries(other);
        if let Err(ref e) = result {
            tracing::warn!(error = %e, "merge failed");
        }
        result
    }

    fn merge_entries(&mut self, other: &Dynamic) -> Result<()> {
        if other.is_null() {
            return Ok(());
        }
        if !other.is_object() {
            return Err(Error::type_mismatch(
                "merge",
                self.kind().name(),
                other.kind().name(),
            ));
        }
        if !matches!(self.kind(), Kind::Null | Kind::Object | Kind::Ordered) {
            return Err(Error::Unsupported(format!("merge into {}", self.kind())));
        }
        for (key, value) in other.entries()? {
            let slot = self.at_with_insert(key)?;
            if slot.is_null() {
                *slot = value.clone();
                continue;
            }
            if slot.is_object() {
                let existing = std::mem::take(slot);
                *slot = Dynamic::Array(vec![existing]);
            }
            slot.append(value.clone())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_numbers_strings_vectors() {
        let mut a = Dynamic::Int(1);
        a.append(Dynamic::Int(2)).unwrap();
        assert_eq!(a, Dynamic::Int(3));

        let mut b = Dynamic::Int(1);
        b.append(Dynamic::Double(0.5)).unwrap();
        assert_eq!(b, Dynamic::Double(1.5));

        let mut s = Dynamic::from("foo");
        s.append(Dynamic::from("bar")).unwrap();
        assert_eq!(s, Dynamic::from("foobar"));

        let mut v = Dynamic::Array(vec![1i64.into()]);
        v.append(Dynamic::Array(vec![2i64.into()])).unwrap();
        v.append(Dynamic::Int(3)).unwrap();
        assert_eq!(
            v,
            Dynamic::Array(vec![1i64.into(), 2i64.into(), 3i64.into()])
        );

        let mut bad = Dynamic::from("x");
        assert!(matches!(
            bad.append(Dynamic::Int(1)),
            Err(Error::TypeMismatch(_))
        ));
    }

    #[test]
    fn dot_product() {
        let a = Dynamic::Array(vec![1i64.into(), 2i64.into()]);
        let b = Dynamic::Array(vec![3i64.into(), 4i64.into()]);
        assert_eq!(a.mul(&b).unwrap(), Dynamic::Int(11));

        let empty = Dynamic::Array(vec![]);
        assert_eq!(empty.mul(&empty).unwrap(), Dynamic::Double(0.0));

        let short = Dynamic::Array(vec![1i64.into()]);
        assert!(a.mul(&short).is_err());
        assert_eq!(
            Dynamic::Int(2).mul(&Dynamic::Double(1.5)).unwrap(),
            Dynamic::Double(3.0)
        );
    }

    #[test]
    fn merge_sums_and_concatenates() {
        let mut a = Dynamic::object_from([("a", 10i64)]);
        a.merge(&Dynamic::object_from([("a", 20i64)])).unwrap();
        assert_eq!(a, Dynamic::object_from([("a", 30i64)]));

        let mut v = Dynamic::object_from([("a", Dynamic::Array(vec![10i64.into()]))]);
        v.merge(&Dynamic::object_from([("a", Dynamic::Array(vec![20i64.into()]))]))
            .unwrap();
        assert_eq!(
            v,
            Dynamic::object_from([("a", Dynamic::Array(vec![10i64.into(), 20i64.into()]))])
        );
    }

    #[test]
    fn merge_wraps_nested_maps_into_list() {
        let rec = |n: i64| Dynamic::object_from([("a", Dynamic::object_from([("count", n)]))]);
        let mut acc = rec(10);
        acc.merge(&rec(20)).unwrap();
        acc.merge(&rec(30)).unwrap();
        let expected = Dynamic::object_from([(
            "a",
            Dynamic::Array(vec![
                Dynamic::object_from([("count", 10i64)]),
                Dynamic::object_from([("count", 20i64)]),
                Dynamic::object_from([("count", 30i64)]),
            ]),
        )]);
        assert_eq!(acc, expected);
    }

    #[test]
    fn merge_disjoint_keys_is_union() {
        let mut acc = Dynamic::object_from([("assoc1", Dynamic::object_from([("x", 1i64)]))]);
        acc.merge(&Dynamic::object_from([("assoc2", Dynamic::object_from([("y", 2i64)]))]))
            .unwrap();
        assert_eq!(acc.length().unwrap(), 2);
        assert!(acc.at("assoc2").is_ok());
    }

    #[test]
    fn merge_rejects_scalars() {
        let mut acc = Dynamic::object();
        assert!(acc.merge(&Dynamic::Int(1)).is_err());
        let mut scalar = Dynamic::Int(1);
        assert!(scalar.merge(&Dynamic::object_from([("a", 1i64)])).is_err());
    }
}
