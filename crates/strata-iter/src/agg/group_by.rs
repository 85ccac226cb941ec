use futures::future::BoxFuture;

use strata_core::dynamic::Dynamic;
use strata_core::error::Result;
use strata_core::item::{Record, UNINITIALIZED_ID};

use super::OrderedBuckets;
use crate::traits::{delegate_state, BoxedIterator, IteratorKind, Phase, RecordIterator};
use crate::wrapped::WrappedIterator;

/// Array of the grouping attributes' values. A missing attribute is an
/// error.
fn group_key(rec: &Record, attributes: &[String]) -> Result<Dynamic> {
    let values = attributes
        .iter()
        .map(|attr| rec.value().at(attr).cloned())
        .collect::<Result<Vec<_>>>()?;
    Ok(Dynamic::Array(values))
}

fn key_record(key: Dynamic) -> Record {
    Record::new(UNINITIALIZED_ID, 0, key)
}

/// Buckets the whole input by attribute values and emits one group per
/// distinct key, in ascending key order.
///
/// `key()` is the group key (an array of the attribute values) and `group()`
/// the member records in input order. `value()` carries no record.
pub struct GroupByIterator {
    base: WrappedIterator,
    attributes: Vec<String>,
    phase: Phase,
    groups: Vec<(Record, Vec<Record>)>,
    pos: usize,
}

impl GroupByIterator {
    pub fn new(inner: BoxedIterator, attributes: Vec<String>) -> Self {
        Self {
            base: WrappedIterator::new(inner),
            attributes,
            phase: Phase::NotStarted,
            groups: Vec::new(),
            pos: 0,
        }
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Members of the current group. Empty before the first advance.
    pub fn group(&self) -> &[Record] {
        match self.current_group() {
            Some((_, members)) => members,
            None => &[],
        }
    }

    fn current_group(&self) -> Option<&(Record, Vec<Record>)> {
        if self.phase == Phase::NotStarted || self.done() {
            return None;
        }
        self.groups.get(self.pos)
    }

    fn load(&mut self) -> Result<()> {
        let mut buckets = OrderedBuckets::new();
        let inner = self.base.inner_mut()?;
        while inner.next()? {
            let rec = inner.current();
            let key = group_key(rec, &self.attributes)?;
            buckets.entry_or_insert_with(key, Vec::new)?.push(rec.clone());
        }
        self.groups = buckets
            .into_vec()
            .into_iter()
            .map(|(key, members)| (key_record(key), members))
            .collect();
        Ok(())
    }
}

impl RecordIterator for GroupByIterator {
    fn name(&self) -> &'static str {
        "group_by"
    }

    fn kind(&self) -> IteratorKind {
        IteratorKind::Wrapped
    }

    delegate_state!(base);

    fn prepare(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.base.prepare_inner())
    }

    fn do_next(&mut self) -> Result<bool> {
        if self.done() {
            return Ok(false);
        }
        match self.phase {
            Phase::NotStarted => {
                self.phase = Phase::Active;
                self.load()?;
            }
            Phase::Active => self.pos += 1,
        }
        if self.pos >= self.groups.len() {
            self.base.state_mut().set_done();
            return Ok(false);
        }
        Ok(true)
    }

    fn current(&self) -> &Record {
        Record::empty_ref()
    }

    fn key(&self) -> &Record {
        match self.current_group() {
            Some((key, _)) => key,
            None => Record::empty_ref(),
        }
    }

    fn child_count(&self) -> usize {
        1
    }
}

/// Counts records per distinct attribute key and emits the counts in
/// descending key order.
///
/// `key()` is the group key; `value()` is a record whose payload is the
/// count. Counts are exact for any input order; input already sorted by the
/// grouping attributes is what keeps this cheap upstream.
pub struct GroupBySortedCountIterator {
    base: WrappedIterator,
    attributes: Vec<String>,
    phase: Phase,
    counts: Vec<(Record, Record)>,
    pos: usize,
}

impl GroupBySortedCountIterator {
    pub fn new(inner: BoxedIterator, attributes: Vec<String>) -> Self {
        Self {
            base: WrappedIterator::new(inner),
            attributes,
            phase: Phase::NotStarted,
            counts: Vec::new(),
            pos: 0,
        }
    }

    /// Count of the current group, 0 before the first advance.
    pub fn count(&self) -> i64 {
        self.current_entry()
            .and_then(|(_, count)| count.value().as_i64())
            .unwrap_or(0)
    }

    fn current_entry(&self) -> Option<&(Record, Record)> {
        if self.phase == Phase::NotStarted || self.done() {
            return None;
        }
        self.counts.get(self.pos)
    }

    fn load(&mut self) -> Result<()> {
        let mut buckets = OrderedBuckets::new();
        let inner = self.base.inner_mut()?;
        while inner.next()? {
            let key = group_key(inner.current(), &self.attributes)?;
            *buckets.entry_or_insert_with(key, || 0i64)? += 1;
        }
        self.counts = buckets
            .into_vec()
            .into_iter()
            .rev()
            .map(|(key, n)| (key_record(key), Record::new(UNINITIALIZED_ID, 0, Dynamic::Int(n))))
            .collect();
        Ok(())
    }
}

impl RecordIterator for GroupBySortedCountIterator {
    fn name(&self) -> &'static str {
        "group_by_sorted_count"
    }

    fn kind(&self) -> IteratorKind {
        IteratorKind::Wrapped
    }

    delegate_state!(base);

    fn prepare(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.base.prepare_inner())
    }

    fn do_next(&mut self) -> Result<bool> {
        if self.done() {
            return Ok(false);
        }
        match self.phase {
            Phase::NotStarted => {
                self.phase = Phase::Active;
                self.load()?;
            }
            Phase::Active => self.pos += 1,
        }
        if self.pos >= self.counts.len() {
            self.base.state_mut().set_done();
            return Ok(false);
        }
        Ok(true)
    }

    fn current(&self) -> &Record {
        match self.current_entry() {
            Some((_, count)) => count,
            None => Record::empty_ref(),
        }
    }

    fn key(&self) -> &Record {
        match self.current_entry() {
            Some((key, _)) => key,
            None => Record::empty_ref(),
        }
    }

    fn child_count(&self) -> usize {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::VecIterator;
    use futures::executor::block_on;

    fn rows(pairs: &[(i64, i64)]) -> BoxedIterator {
        let n = pairs.len() as u64;
        Box::new(VecIterator::from_values(pairs.iter().enumerate().map(|(i, (a, b))| {
            (n - i as u64, Dynamic::object_from([("a", *a), ("b", *b)]))
        })))
    }

    fn attrs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn groups_in_ascending_key_order() {
        let mut g = GroupByIterator::new(rows(&[(1, 3), (1, 1), (1, 2), (2, 2)]), attrs(&["a"]));
        block_on(g.prepare()).unwrap();
        assert!(g.group().is_empty());

        assert!(g.next().unwrap());
        assert_eq!(g.key().value(), &Dynamic::Array(vec![Dynamic::Int(1)]));
        assert_eq!(g.group().iter().map(Record::id).collect::<Vec<_>>(), vec![4, 3, 2]);
        assert_eq!(g.value().unwrap(), Record::empty_ref());

        assert!(g.next().unwrap());
        assert_eq!(g.key().value(), &Dynamic::Array(vec![Dynamic::Int(2)]));
        assert_eq!(g.group().len(), 1);
        assert!(!g.next().unwrap());
        assert!(g.group().is_empty());
    }

    #[test]
    fn missing_attribute_fails() {
        let mut g = GroupByIterator::new(rows(&[(1, 1)]), attrs(&["zzz"]));
        block_on(g.prepare()).unwrap();
        assert!(g.next().is_err());
    }

    #[test]
    fn sorted_count_descends() {
        let mut g = GroupBySortedCountIterator::new(
            rows(&[(1, 1), (1, 2), (2, 2), (3, 1), (3, 5), (3, 9)]),
            attrs(&["a"]),
        );
        block_on(g.prepare()).unwrap();
        let mut out = Vec::new();
        while g.next().unwrap() {
            out.push((g.key().value().clone(), g.count()));
            assert_eq!(g.value().unwrap().value(), &Dynamic::Int(g.count()));
        }
        assert_eq!(
            out,
            vec![
                (Dynamic::Array(vec![Dynamic::Int(3)]), 3),
                (Dynamic::Array(vec![Dynamic::Int(2)]), 1),
                (Dynamic::Array(vec![Dynamic::Int(1)]), 2),
            ]
        );
    }

    #[test]
    fn empty_input_has_no_groups() {
        let mut g = GroupByIterator::new(rows(&[]), attrs(&["a"]));
        block_on(g.prepare()).unwrap();
        assert!(!g.next().unwrap());
        assert!(g.done());
    }
}
