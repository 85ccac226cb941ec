//! Zero-copy row projection: shared column names plus a parallel value vector.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::error::{Error, Result};

use super::compare::lexicographic;
use super::Dynamic;

/// A row viewed through a shared column-name array.
///
/// Keys and values must have equal length. The invariant is checked when the
/// view is read, not when it is built; a violation is reported as
/// [`Error::MalformedValue`].
#[derive(Debug, Clone, Default)]
pub struct PairedView {
    keys: Option<Arc<[String]>>,
    values: Vec<Dynamic>,
}

impl PairedView {
    pub fn new(keys: Arc<[String]>, values: Vec<Dynamic>) -> Self {
        Self {
            keys: Some(keys),
            values,
        }
    }

    /// A view whose column names were never attached.
    pub fn detached(values: Vec<Dynamic>) -> Self {
        Self { keys: None, values }
    }

    pub fn values(&self) -> &[Dynamic] {
        &self.values
    }

    pub fn raw_keys(&self) -> Option<&[String]> {
        self.keys.as_deref()
    }

    /// Column names, validated against the value vector.
    pub fn keys(&self) -> Result<&[String]> {
        let keys = self
            .keys
            .as_deref()
            .ok_or_else(|| Error::MalformedValue("paired view has no key array".into()))?;
        if keys.len() != self.values.len() {
            return Err(Error::MalformedValue(format!(
                "paired view has {} keys but {} values",
                keys.len(),
                self.values.len()
            )));
        }
        Ok(keys)
    }

    pub fn get(&self, key: &str) -> Result<Option<&Dynamic>> {
        let keys = self.keys()?;
        Ok(keys
            .iter()
            .position(|k| k == key)
            .map(|i| &self.values[i]))
    }

    pub fn pairs(&self) -> Result<impl Iterator<Item = (&str, &Dynamic)>> {
        let keys = self.keys()?;
        Ok(keys.iter().map(String::as_str).zip(self.values.iter()))
    }

    pub(crate) fn try_less(&self, other: &PairedView) -> Result<bool> {
        let (ka, kb) = (self.keys()?, other.keys()?);
        if ka.len() != kb.len() {
            return Err(Error::MalformedValue(format!(
                "cannot compare paired views with {} and {} keys",
                ka.len(),
                kb.len()
            )));
        }
        for i in 0..ka.len() {
            if ka[i] != kb[i] {
                return Ok(ka[i] < kb[i]);
            }
            if self.values[i] != other.values[i] {
                return self.values[i].try_less(&other.values[i]);
            }
        }
        Ok(false)
    }

    /// Columns and values pairwise, then by key and value counts.
    pub(crate) fn total_cmp(&self, other: &PairedView) -> Ordering {
        let shape = |p: &PairedView| (p.raw_keys().map_or(0, <[String]>::len), p.values.len());
        lexicographic(&self.zipped(), &other.zipped(), |a, b| {
            a.0.cmp(b.0).then_with(|| a.1.total_cmp(b.1))
        })
        .then_with(|| shape(self).cmp(&shape(other)))
    }

    // Unvalidated pairs; a length mismatch truncates to the shorter side.
    fn zipped(&self) -> Vec<(&str, &Dynamic)> {
        self.raw_keys()
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
            .collect()
    }
}

impl PartialEq for PairedView {
    fn eq(&self, other: &Self) -> bool {
        self.raw_keys() == other.raw_keys() && self.values == other.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Arc<[String]> {
        names.iter().map(|s| s.to_string()).collect::<Vec<_>>().into()
    }

    #[test]
    fn lookup_by_column() {
        let p = PairedView::new(cols(&["a", "b"]), vec![1i64.into(), 2i64.into()]);
        assert_eq!(p.get("b").unwrap(), Some(&Dynamic::Int(2)));
        assert_eq!(p.get("c").unwrap(), None);
    }

    #[test]
    fn length_mismatch_is_malformed() {
        let p = PairedView::new(cols(&["a", "b"]), vec![1i64.into()]);
        assert!(matches!(p.get("a"), Err(Error::MalformedValue(_))));
        let d = PairedView::detached(vec![1i64.into()]);
        assert!(matches!(d.keys(), Err(Error::MalformedValue(_))));
    }

    #[test]
    fn ordering_by_column_then_value() {
        let a = PairedView::new(cols(&["a", "b"]), vec![1i64.into(), 2i64.into()]);
        let b = PairedView::new(cols(&["a", "b"]), vec![1i64.into(), 3i64.into()]);
        assert!(a.try_less(&b).unwrap());
        assert!(!b.try_less(&a).unwrap());
        let c = PairedView::new(cols(&["a"]), vec![1i64.into()]);
        assert!(a.try_less(&c).is_err());
    }
}
