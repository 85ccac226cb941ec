use strata_core::dynamic::Dynamic;
use strata_core::error::Result;
use strata_core::item::Record;

use super::map::{MapIterator, RecordMap};
use crate::traits::BoxedIterator;

/// Keeps the named attributes of a payload as a sorted map. Absent
/// attributes are left out.
pub struct Projection {
    attributes: Vec<String>,
}

impl Projection {
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }
}

impl RecordMap for Projection {
    const NAME: &'static str = "project";

    fn apply(&self, rec: &Record) -> Result<Record> {
        let projected = rec.value().project(&self.attributes);
        Ok(Record::new(rec.id(), rec.ts(), Dynamic::Ordered(projected)))
    }
}

pub type ProjectIterator = MapIterator<Projection>;

impl MapIterator<Projection> {
    pub fn new(inner: BoxedIterator, attributes: Vec<String>) -> Self {
        Self::with_map(inner, Projection { attributes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::VecIterator;
    use crate::traits::RecordIterator;
    use futures::executor::block_on;

    #[test]
    fn keeps_named_columns() {
        let leaf = VecIterator::from_values([
            (2, Dynamic::object_from([("a", 2i64), ("b", 11), ("c", 21)])),
            (1, Dynamic::object_from([("a", 1i64), ("b", 10), ("c", 20)])),
        ]);
        let mut p = ProjectIterator::new(Box::new(leaf), vec!["a".into(), "c".into(), "zzz".into()]);
        block_on(p.prepare()).unwrap();

        assert!(p.next().unwrap());
        assert_eq!(
            p.value().unwrap(),
            &Record::new(2, 0, Dynamic::ordered_from([("a", 2i64), ("c", 21)]))
        );
        assert!(p.next().unwrap());
        assert_eq!(p.value().unwrap().value(), &Dynamic::ordered_from([("a", 1i64), ("c", 20)]));
        assert!(!p.next().unwrap());
        assert_eq!(p.value().unwrap(), Record::empty_ref());
    }

    #[test]
    fn skip_to_projects_landing_record() {
        let leaf = VecIterator::from_values([
            (9, Dynamic::object_from([("a", 9i64)])),
            (4, Dynamic::object_from([("a", 4i64)])),
        ]);
        let mut p = ProjectIterator::new(Box::new(leaf), vec!["a".into()]);
        block_on(p.prepare()).unwrap();
        assert!(p.skip_to(5).unwrap());
        assert_eq!(p.id(), 4);
        assert_eq!(p.value().unwrap().value(), &Dynamic::ordered_from([("a", 4i64)]));
    }
}
