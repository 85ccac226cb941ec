//! Operators that buffer or combine records: merge, grouping, sorting.

mod group_by;
mod merge;
mod order_by;

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::Bound;

use strata_core::dynamic::Dynamic;
use strata_core::error::Result;

pub use group_by::{GroupByIterator, GroupBySortedCountIterator};
pub use merge::MergeIterator;
pub use order_by::OrderByIterator;

/// `Dynamic` under its total order, usable as a map key.
#[derive(Debug, Clone)]
pub(crate) struct GroupKey(Dynamic);

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GroupKey {}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Values keyed by `Dynamic`, kept in ascending key order.
///
/// Keys must be mutually comparable: a new key is checked with `try_cmp`
/// against its neighbours and an incomparable one is rejected with the
/// comparison error.
pub(crate) struct OrderedBuckets<V> {
    entries: BTreeMap<GroupKey, V>,
}

impl<V> OrderedBuckets<V> {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    fn check_neighbours(&self, key: &GroupKey) -> Result<()> {
        let below = self.entries.range(..key).next_back();
        let above = self
            .entries
            .range((Bound::Excluded(key), Bound::Unbounded))
            .next();
        for (k, _) in below.into_iter().chain(above) {
            k.0.try_cmp(&key.0)?;
        }
        Ok(())
    }

    pub(crate) fn entry_or_insert_with<F>(&mut self, key: Dynamic, default: F) -> Result<&mut V>
    where
        F: FnOnce() -> V,
    {
        let key = GroupKey(key);
        if !self.entries.contains_key(&key) {
            self.check_neighbours(&key)?;
        }
        Ok(self.entries.entry(key).or_insert_with(default))
    }

    pub(crate) fn into_vec(self) -> Vec<(Dynamic, V)> {
        self.entries.into_iter().map(|(k, v)| (k.0, v)).collect()
    }
}
