//! Four-valued comparison of records over a column projection.

use std::cmp::Ordering;

use crate::item::{Record, ID_KEY, TIME_KEY};
use crate::log::LOG_EVERY_N;
use crate::warn_every_n;

/// Result of comparing two records on a set of columns.
///
/// `None` means the records could not be ordered on those columns. It is not
/// equality and must not be treated as such where a total order is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartialOrder {
    Lt,
    Eq,
    Gt,
    None,
}

impl PartialOrder {
    pub fn is_comparable(self) -> bool {
        self != PartialOrder::None
    }

    /// `None` collapses to `Equal`.
    pub fn to_ordering_lossy(self) -> Ordering {
        match self {
            PartialOrder::Lt => Ordering::Less,
            PartialOrder::Gt => Ordering::Greater,
            PartialOrder::Eq | PartialOrder::None => Ordering::Equal,
        }
    }
}

impl From<Ordering> for PartialOrder {
    fn from(o: Ordering) -> Self {
        match o {
            Ordering::Less => PartialOrder::Lt,
            Ordering::Equal => PartialOrder::Eq,
            Ordering::Greater => PartialOrder::Gt,
        }
    }
}

/// Compare `v1` against `v2` on `columns`.
///
/// With no columns the whole records are compared. Otherwise `"id"` and
/// `"time"` use the cached fields and other columns are looked up without
/// failing (absent columns read as null). For a descending column `Lt` means
/// `v1 < v2`; for an ascending one it means `v1 > v2`. The first column that
/// differs decides. A column whose values cannot be ordered is skipped but
/// turns an otherwise equal result into `None`.
///
/// `descending` must have one flag per column; missing flags default to
/// descending.
pub fn partial_compare(
    v1: &Record,
    v2: &Record,
    columns: &[String],
    descending: &[bool],
) -> PartialOrder {
    if columns.is_empty() {
        if v1 == v2 {
            return PartialOrder::Eq;
        }
        return match v1.try_cmp(v2) {
            Ok(Ordering::Less) => PartialOrder::Lt,
            Ok(_) => PartialOrder::Gt,
            Err(e) => {
                warn_every_n!(LOG_EVERY_N, error = %e, "records are not comparable");
                PartialOrder::None
            }
        };
    }

    debug_assert!(descending.is_empty() || descending.len() == columns.len());
    let mut comparable = true;

    for (i, column) in columns.iter().enumerate() {
        let is_descending = descending.get(i).copied().unwrap_or(true);

        let ordering = match column.as_str() {
            TIME_KEY => Some(v1.ts().cmp(&v2.ts())),
            ID_KEY => Some(v1.id().cmp(&v2.id())),
            _ => {
                let a = v1.value().at_no_throw(column);
                let b = v2.value().at_no_throw(column);
                if a == b {
                    Some(Ordering::Equal)
                } else {
                    match a.try_cmp(b) {
                        Ok(o) => Some(o),
                        Err(e) => {
                            warn_every_n!(LOG_EVERY_N, column = %column, error = %e, "column is not comparable");
                            None
                        }
                    }
                }
            }
        };

        match ordering {
            None => comparable = false,
            Some(Ordering::Equal) => {}
            Some(o) => {
                let less = if is_descending {
                    o == Ordering::Less
                } else {
                    o == Ordering::Greater
                };
                return if less {
                    PartialOrder::Lt
                } else {
                    PartialOrder::Gt
                };
            }
        }
    }

    if comparable {
        PartialOrder::Eq
    } else {
        PartialOrder::None
    }
}

/// [`partial_compare`] with every column descending.
pub fn partial_compare_desc(v1: &Record, v2: &Record, columns: &[String]) -> PartialOrder {
    partial_compare(v1, v2, columns, &[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::Dynamic;

    fn rec(id: u64, a: i64, b: i64) -> Record {
        Record::new(id, 0, Dynamic::object_from([("a", a), ("b", b)]))
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn first_differing_column_decides() {
        let x = rec(1, 1, 5);
        let y = rec(2, 1, 7);
        assert_eq!(partial_compare_desc(&x, &y, &cols(&["a", "b"])), PartialOrder::Lt);
        assert_eq!(partial_compare_desc(&y, &x, &cols(&["a", "b"])), PartialOrder::Gt);
        assert_eq!(partial_compare_desc(&x, &y, &cols(&["a"])), PartialOrder::Eq);
    }

    #[test]
    fn ascending_flag_inverts() {
        let x = rec(1, 1, 5);
        let y = rec(2, 2, 5);
        assert_eq!(
            partial_compare(&x, &y, &cols(&["a"]), &[false]),
            PartialOrder::Gt
        );
        assert_eq!(
            partial_compare(&x, &y, &cols(&["a"]), &[true]),
            PartialOrder::Lt
        );
    }

    #[test]
    fn reserved_columns_use_cached_fields() {
        let x = Record::new(1, 10, Dynamic::Null);
        let y = Record::new(2, 10, Dynamic::Null);
        assert_eq!(partial_compare_desc(&x, &y, &cols(&["time"])), PartialOrder::Eq);
        assert_eq!(partial_compare_desc(&x, &y, &cols(&["time", "id"])), PartialOrder::Lt);
    }

    #[test]
    fn incomparable_column_yields_none() {
        let x = Record::new(1, 0, Dynamic::object_from([("a", 1i64)]));
        let y = Record::new(1, 0, Dynamic::object_from([("a", "s")]));
        assert_eq!(partial_compare_desc(&x, &y, &cols(&["a"])), PartialOrder::None);
        // A later decisive column still wins.
        let x2 = rec(1, 1, 1);
        let y2 = Record::new(1, 0, Dynamic::object_from([("a", Dynamic::from("s")), ("b", Dynamic::Int(2))]));
        assert_eq!(partial_compare_desc(&x2, &y2, &cols(&["a", "b"])), PartialOrder::Lt);
    }

    #[test]
    fn missing_column_against_present_is_none() {
        let x = Record::new(1, 0, Dynamic::object());
        let y = rec(1, 1, 1);
        assert_eq!(partial_compare_desc(&x, &y, &cols(&["a"])), PartialOrder::None);
    }

    #[test]
    fn whole_record_comparison() {
        let x = Record::new(1, 0, Dynamic::Int(1));
        assert_eq!(partial_compare_desc(&x, &x.clone(), &[]), PartialOrder::Eq);
        let y = Record::new(1, 0, Dynamic::Int(2));
        assert_eq!(partial_compare_desc(&x, &y, &[]), PartialOrder::Lt);
        let z = Record::new(1, 0, Dynamic::object());
        assert_eq!(partial_compare_desc(&z, &z.clone(), &[]), PartialOrder::Eq);
        let w = Record::new(1, 0, Dynamic::object_from([("a", 1i64)]));
        assert_eq!(partial_compare_desc(&z, &w, &[]), PartialOrder::None);
    }
}
