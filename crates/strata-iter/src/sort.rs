use std::cmp::Ordering;

use strata_core::item::Record;
use strata_core::log::LOG_EVERY_N;
use strata_core::warn_every_n;

/// Total order over records for heaps and sorts: `(value, ts, id)`.
///
/// Payloads of different kinds order by kind rather than failing, so a mixed
/// stream still sorts deterministically.
pub(crate) fn cmp_records(a: &Record, b: &Record) -> Ordering {
    let (ka, kb) = (a.value().kind(), b.value().kind());
    if ka != kb {
        warn_every_n!(LOG_EVERY_N, left = %ka, right = %kb, "ordering records of different kinds by kind");
    }
    a.total_cmp(b)
}
