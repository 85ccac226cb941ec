//! Records: a `Dynamic` payload plus a descending `id` and a timestamp.

use std::cmp::Ordering;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::dynamic::Dynamic;
use crate::error::{Error, Result};
use crate::log::LOG_EVERY_N;
use crate::warn_every_n;

/// Record identifier. Streams are ordered by id, highest first.
pub type Id = u64;

/// Reserved payload key holding the record id.
pub const ID_KEY: &str = "id";
/// Reserved payload key holding the record timestamp.
pub const TIME_KEY: &str = "time";

/// Sentinel meaning "id not yet cached".
pub const UNINITIALIZED_ID: Id = 0;

static EMPTY_RECORD: Lazy<ItemOptimized> = Lazy::new(|| {
    ItemOptimized::new(
        Id::MAX,
        0,
        Dynamic::object_from([(ID_KEY, Dynamic::Int(Id::MAX as i64)), (TIME_KEY, Dynamic::Int(0))]),
    )
});

/// A record that reads its id and timestamp out of the payload on demand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item(pub Dynamic);

impl Item {
    pub fn new(value: Dynamic) -> Self {
        Item(value)
    }

    pub fn value(&self) -> &Dynamic {
        &self.0
    }

    pub fn into_value(self) -> Dynamic {
        self.0
    }

    /// Reads `"id"`. Logs and yields 0 when absent or not an integer.
    pub fn id(&self) -> Id {
        match self.0.at(ID_KEY).and_then(Dynamic::get_i64) {
            Ok(v) => v as Id,
            Err(e) => {
                warn_every_n!(LOG_EVERY_N, error = %e, "record has no usable id field");
                0
            }
        }
    }

    /// Reads `"time"`. Logs and yields 0 when absent or not an integer.
    pub fn ts(&self) -> i64 {
        match self.0.at(TIME_KEY).and_then(Dynamic::get_i64) {
            Ok(v) => v,
            Err(e) => {
                warn_every_n!(LOG_EVERY_N, error = %e, "record has no usable time field");
                0
            }
        }
    }
}

impl From<Dynamic> for Item {
    fn from(value: Dynamic) -> Self {
        Item(value)
    }
}

/// A record with id and timestamp cached next to the payload.
///
/// This is the unit that flows through every iterator (see [`Record`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemOptimized {
    id: Id,
    ts: i64,
    value: Dynamic,
}

/// The record type pulled through iterator trees.
pub type Record = ItemOptimized;

impl ItemOptimized {
    pub fn new(id: Id, ts: i64, value: Dynamic) -> Self {
        Self { id, ts, value }
    }

    /// A record with only an id (timestamp 0, null payload).
    pub fn with_id(id: Id) -> Self {
        Self::new(id, 0, Dynamic::Null)
    }

    /// The shared "before the stream" record: id `u64::MAX`, timestamp 0.
    pub fn empty_ref() -> &'static ItemOptimized {
        &EMPTY_RECORD
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn ts(&self) -> i64 {
        self.ts
    }

    pub fn set_id(&mut self, id: Id) {
        self.id = id;
    }

    pub fn set_ts(&mut self, ts: i64) {
        self.ts = ts;
    }

    pub fn value(&self) -> &Dynamic {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Dynamic {
        &mut self.value
    }

    pub fn set_value(&mut self, value: Dynamic) {
        self.value = value;
    }

    pub fn into_value(self) -> Dynamic {
        self.value
    }

    pub fn reset(&mut self) {
        self.id = UNINITIALIZED_ID;
        self.ts = 0;
        self.value = Dynamic::Null;
    }

    /// Refresh the cached id/timestamp from the payload fields.
    pub fn sync_id_ts(&mut self) {
        match (
            self.value.at(ID_KEY).and_then(Dynamic::get_i64),
            self.value.at(TIME_KEY).and_then(Dynamic::get_i64),
        ) {
            (Ok(id), Ok(ts)) => {
                self.id = id as Id;
                self.ts = ts;
            }
            (Err(e), _) | (_, Err(e)) => {
                warn_every_n!(LOG_EVERY_N, error = %e, "cannot sync id/time from payload");
            }
        }
    }

    /// Write the cached id/timestamp into the payload. Paired views cannot
    /// take new keys, so the write is logged and skipped for them.
    pub fn sync_map(&mut self) {
        let id = self.id as i64;
        let ts = self.ts;
        let res = self
            .value
            .insert(ID_KEY, Dynamic::Int(id))
            .and_then(|_| self.value.insert(TIME_KEY, Dynamic::Int(ts)));
        if let Err(e) = res {
            warn_every_n!(LOG_EVERY_N, error = %e, "cannot sync id/time into payload");
        }
    }

    /// Pick a sync direction: an uninitialised id is read from the payload,
    /// otherwise the cached fields are written into it.
    pub fn sync(&mut self) {
        if self.id == UNINITIALIZED_ID {
            self.sync_id_ts();
        } else {
            self.sync_map();
        }
    }

    pub fn is_additional_field(key: &str) -> bool {
        key == ID_KEY || key == TIME_KEY
    }

    pub fn additional_field(&self, key: &str) -> Result<i64> {
        match key {
            ID_KEY => Ok(self.id as i64),
            TIME_KEY => Ok(self.ts),
            other => Err(Error::KeyNotFound(format!("{other} is not an additional field"))),
        }
    }

    /// Ordering by `(value, ts, id)`. Fails when the payloads cannot be ordered.
    pub fn try_cmp(&self, other: &ItemOptimized) -> Result<Ordering> {
        Ok(self
            .value
            .try_cmp(&other.value)?
            .then(self.ts.cmp(&other.ts))
            .then(self.id.cmp(&other.id)))
    }

    /// Total ordering by `(value, ts, id)`, with payloads compared by
    /// [`Dynamic::total_cmp`].
    pub fn total_cmp(&self, other: &ItemOptimized) -> Ordering {
        self.value
            .total_cmp(&other.value)
            .then(self.ts.cmp(&other.ts))
            .then(self.id.cmp(&other.id))
    }

    /// Relaxed equality: same id and timestamp, and either both payloads are
    /// empty or they are equal.
    pub fn equals(&self, other: &ItemOptimized) -> bool {
        if (self.id, self.ts) != (other.id, other.ts) {
            return false;
        }
        if self.value.is_empty() && other.value.is_empty() {
            return true;
        }
        self.value == other.value
    }

    /// `"<ts>,<id>"`, the resumable position of this record.
    pub fn cookie(&self) -> String {
        format!("{},{}", self.ts, self.id)
    }
}

impl PartialEq for ItemOptimized {
    /// Exact equality: payload (kind sensitive), id and timestamp.
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.id == other.id && self.ts == other.ts
    }
}

impl From<Item> for ItemOptimized {
    fn from(item: Item) -> Self {
        let mut rec = ItemOptimized::new(UNINITIALIZED_ID, 0, item.0);
        rec.sync_id_ts();
        rec
    }
}

impl fmt::Display for ItemOptimized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.ts, self.id, self.value.to_json())
    }
}
