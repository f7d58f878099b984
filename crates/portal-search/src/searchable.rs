//! The capability every record type exposes to the filter engine.

use std::borrow::Cow;
use std::cmp::Ordering;

use chrono::{DateTime, Utc};

/// A single field value as seen by filters and sorting.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(Cow<'a, str>),
    Bool(bool),
    Number(f64),
    Timestamp(DateTime<Utc>),
}

impl<'a> FieldValue<'a> {
    /// Borrowed text value.
    pub fn text(s: &'a str) -> Self {
        FieldValue::Text(Cow::Borrowed(s))
    }

    /// Owned text value, for computed fields.
    pub fn owned(s: String) -> Self {
        FieldValue::Text(Cow::Owned(s))
    }

    /// Text shown for this value in chips, badges and column filters.
    ///
    /// Booleans render as the status badge text.
    pub fn display_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(s) => Cow::Borrowed(s.as_ref()),
            FieldValue::Bool(b) => Cow::Borrowed(status_label(*b)),
            FieldValue::Number(n) => Cow::Owned(n.to_string()),
            FieldValue::Timestamp(t) => Cow::Owned(t.to_rfc3339()),
        }
    }

    /// Compare two values for sorting.
    ///
    /// Text compares case-insensitively, numbers numerically, timestamps
    /// chronologically, booleans through their status text. Values of
    /// different kinds compare by their display text.
    pub fn sort_cmp(&self, other: &FieldValue<'_>) -> Ordering {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => a.total_cmp(b),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => a.cmp(b),
            _ => compare_text(&self.display_text(), &other.display_text()),
        }
    }
}

/// Badge text for a boolean status field.
pub fn status_label(active: bool) -> &'static str {
    if active {
        "Active"
    } else {
        "Inactive"
    }
}

/// Case-insensitive comparison. Strings differing only in case are equal.
///
/// Lower-cased text is ordered by code point, not by a locale collation, so
/// accented letters sort after `z` ("émile" after "zoe").
pub fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Which field a classified smart query is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SmartTarget {
    Email,
    Phone,
    City,
    Category,
    Status,
}

impl SmartTarget {
    /// Field name consulted when a record does not override the routing.
    pub fn default_field(&self) -> &'static str {
        match self {
            SmartTarget::Email => "email",
            SmartTarget::Phone => "phone",
            SmartTarget::City => "city",
            SmartTarget::Category => "category",
            SmartTarget::Status => "isActive",
        }
    }
}

/// A record the filter engine can search, filter and sort.
pub trait Searchable {
    /// Field names understood by [`Searchable::field`].
    const FIELDS: &'static [&'static str];

    /// Look up a named field. `None` means the record has no value for it.
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;

    /// Every string-valued field, used by plain substring search.
    fn text_fields(&self) -> Vec<&str>;

    /// Fields consulted by the fuzzy fallback of smart search.
    fn fuzzy_fields(&self) -> Vec<Cow<'_, str>> {
        self.text_fields().into_iter().map(Cow::Borrowed).collect()
    }

    /// Field consulted for a classified smart query.
    fn smart_field(&self, target: SmartTarget) -> Option<FieldValue<'_>> {
        self.field(target.default_field())
    }

    /// Whether `name` is a known field of this record type.
    fn has_field(name: &str) -> bool {
        Self::FIELDS.contains(&name)
    }
}
