use std::fmt;

use futures::future::BoxFuture;

use strata_core::dynamic::Dynamic;
use strata_core::error::{Error, Result};
use strata_core::item::{Id, Record, ID_KEY, TIME_KEY};
use strata_core::log::LOG_EVERY_N;
use strata_core::warn_every_n;

use crate::traits::{delegate_state, BoxedIterator, IteratorKind, RecordIterator};
use crate::wrapped::WrappedIterator;

/// Predicate applied by [`FilterIterator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    /// Matches nothing.
    #[default]
    Invalid,
    Ge,
    Gt,
    Le,
    Lt,
    /// The field value is one of the filter values.
    Eq,
    Ne,
    /// Accepted but matches nothing.
    Exists,
    Prefix,
    Contains,
    /// Inclusive, between the first two filter values.
    Range,
    InSet,
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FilterType::Invalid => "invalid",
            FilterType::Ge => ">=",
            FilterType::Gt => ">",
            FilterType::Le => "<=",
            FilterType::Lt => "<",
            FilterType::Eq => "=",
            FilterType::Ne => "!=",
            FilterType::Exists => "exists",
            FilterType::Prefix => "prefix",
            FilterType::Contains => "contains",
            FilterType::Range => "range",
            FilterType::InSet => "inset",
        };
        f.write_str(s)
    }
}

/// Value a record holds for `field`; `"id"` and `"time"` read the cached
/// fields.
fn field_value(rec: &Record, field: &str) -> Dynamic {
    match field {
        ID_KEY => Dynamic::Int(rec.id() as i64),
        TIME_KEY => Dynamic::Int(rec.ts()),
        _ => rec.value().at_no_throw(field).clone(),
    }
}

fn to_int(value: Dynamic) -> Result<Dynamic> {
    if value.is_int() {
        return Ok(value);
    }
    let text = value.to_string_lossy();
    text.trim()
        .parse::<i64>()
        .map(Dynamic::Int)
        .map_err(|e| Error::MalformedValue(format!("{text:?} is not an integer: {e}")))
}

fn string_match(filter_type: FilterType, v: &Dynamic, rhs: &Dynamic) -> bool {
    match (v.as_str(), rhs.as_str()) {
        (Some(s), Some(pattern)) => match filter_type {
            FilterType::Prefix => s.starts_with(pattern),
            _ => s.contains(pattern),
        },
        _ => {
            warn_every_n!(
                LOG_EVERY_N,
                filter = %filter_type,
                lhs = %v.kind(),
                rhs = %rhs.kind(),
                "string filter on non-string values"
            );
            false
        }
    }
}

fn evaluate(filter_type: FilterType, v: &Dynamic, values: &[Dynamic], all: &Dynamic) -> Result<bool> {
    let rhs = match values {
        [] => return Ok(false),
        [single] => single,
        _ => all,
    };
    let matched = match filter_type {
        FilterType::Ge => v.try_greater_eq(rhs)?,
        FilterType::Gt => v.try_greater(rhs)?,
        FilterType::Le => v.try_less_eq(rhs)?,
        FilterType::Lt => v.try_less(rhs)?,
        FilterType::Range => {
            let [lo, hi, ..] = values else {
                return Err(Error::KeyNotFound("range filter needs two values".into()));
            };
            v.try_greater_eq(lo)? && v.try_less_eq(hi)?
        }
        FilterType::Eq | FilterType::InSet => values.contains(v),
        FilterType::Ne => v != rhs,
        FilterType::Prefix | FilterType::Contains => string_match(filter_type, v, rhs),
        FilterType::Exists | FilterType::Invalid => false,
    };
    Ok(matched)
}

/// Passes through the records of its child that satisfy a predicate over
/// one or more fields.
///
/// With a single field the comparison type is learned from the first
/// non-empty value seen: every textual filter value is cast to that value's
/// kind.
/// With several fields the record's values form an array that is compared
/// against the filter values.
///
/// A record whose evaluation fails is logged and skipped.
pub struct FilterIterator {
    base: WrappedIterator,
    fields: Vec<String>,
    values: Vec<Dynamic>,
    all_values: Dynamic,
    filter_type: FilterType,
    learned: bool,
}

impl FilterIterator {
    /// A filter that matches nothing until [`set_filter`](Self::set_filter)
    /// is called.
    pub fn new(inner: BoxedIterator) -> Self {
        Self {
            base: WrappedIterator::new(inner),
            fields: Vec::new(),
            values: Vec::new(),
            all_values: Dynamic::Array(Vec::new()),
            filter_type: FilterType::Invalid,
            learned: false,
        }
    }

    pub fn with_filter(
        inner: BoxedIterator,
        fields: Vec<String>,
        values: Vec<Dynamic>,
        filter_type: FilterType,
    ) -> Result<Self> {
        let mut filter = Self::new(inner);
        filter.set_filter(fields, values, filter_type)?;
        Ok(filter)
    }

    /// Values lined up with an `"id"` or `"time"` field are converted to
    /// integers, parsing their text form when needed.
    pub fn set_filter(
        &mut self,
        fields: Vec<String>,
        values: Vec<Dynamic>,
        filter_type: FilterType,
    ) -> Result<()> {
        let values = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| match fields.get(i) {
                Some(field) if Record::is_additional_field(field) => to_int(value),
                _ => Ok(value),
            })
            .collect::<Result<Vec<_>>>()?;

        self.all_values = Dynamic::Array(values.clone());
        self.values = values;
        self.fields = fields;
        self.filter_type = filter_type;
        self.learned = false;
        Ok(())
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn values(&self) -> &[Dynamic] {
        &self.values
    }

    fn matches(&mut self) -> Result<bool> {
        let rec = self.base.inner()?.current();
        let v = match self.fields.as_slice() {
            [field] => {
                let v = field_value(rec, field);
                if !self.learned && !Record::is_additional_field(field) && !v.is_empty() {
                    self.learned = true;
                    let cast = self
                        .values
                        .iter_mut()
                        .filter(|value| value.is_string())
                        .try_for_each(|value| value.cast_to(&v));
                    self.all_values = Dynamic::Array(self.values.clone());
                    cast?;
                }
                v
            }
            fields => Dynamic::Array(fields.iter().map(|f| field_value(rec, f)).collect()),
        };
        evaluate(self.filter_type, &v, &self.values, &self.all_values)
    }

    fn matches_logged(&mut self) -> bool {
        match self.matches() {
            Ok(matched) => matched,
            Err(e) => {
                let id = self.base.inner_current().id();
                warn_every_n!(LOG_EVERY_N, id, error = %e, "filter match failed");
                false
            }
        }
    }
}

impl RecordIterator for FilterIterator {
    fn name(&self) -> &'static str {
        "filter"
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
        while self.base.advance_inner()? {
            if self.matches_logged() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn do_skip_to(&mut self, target: Id) -> Result<bool> {
        if self.done() {
            return Ok(false);
        }
        if !self.base.skip_inner_to(target)? {
            return Ok(false);
        }
        if self.matches_logged() {
            return Ok(true);
        }
        self.do_next()
    }

    fn current(&self) -> &Record {
        self.base.inner_current()
    }

    fn key(&self) -> &Record {
        self.base.inner_key()
    }

    fn order_preserving(&self) -> bool {
        true
    }

    fn child_count(&self) -> usize {
        1
    }
}
