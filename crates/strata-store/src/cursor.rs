//! Cursor contract for sorted key/value stores.

use strata_core::error::Result;

/// Forward cursor over a sorted key/value store.
///
/// Keys must come out in the order the kernel needs: under the id codec in
/// [`crate::codec`], highest id first. Stores with an ascending order supply
/// a reverse comparator or an adapter.
pub trait KvCursor: Send {
    /// Position on the first entry, or become invalid when there is none.
    fn seek_to_first(&mut self);

    fn valid(&self) -> bool;

    /// Step to the next entry. Only called while `valid()`.
    fn next(&mut self);

    /// Key of the current entry. Empty when invalid.
    fn key(&self) -> &[u8];

    /// Value of the current entry. Empty when invalid.
    fn value(&self) -> &[u8];

    /// Backend error, if the last operation hit one.
    fn status(&self) -> Result<()>;
}

impl<C: KvCursor + ?Sized> KvCursor for Box<C> {
    fn seek_to_first(&mut self) {
        (**self).seek_to_first()
    }

    fn valid(&self) -> bool {
        (**self).valid()
    }

    fn next(&mut self) {
        (**self).next()
    }

    fn key(&self) -> &[u8] {
        (**self).key()
    }

    fn value(&self) -> &[u8] {
        (**self).value()
    }

    fn status(&self) -> Result<()> {
        (**self).status()
    }
}
