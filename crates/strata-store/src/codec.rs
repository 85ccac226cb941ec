//! Id key encoding.
//!
//! Ids are stored as 8 big-endian bytes, so bytewise key order is id order.
//! A reverse-ordered store therefore yields the highest id first.

use strata_core::item::Id;

pub const ID_KEY_LEN: usize = 8;

pub fn encode_id(id: Id) -> [u8; ID_KEY_LEN] {
    id.to_be_bytes()
}

/// `None` unless `bytes` is exactly one encoded id.
pub fn decode_id(bytes: &[u8]) -> Option<Id> {
    <[u8; ID_KEY_LEN]>::try_from(bytes).ok().map(Id::from_be_bytes)
}
