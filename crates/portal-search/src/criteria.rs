//! Filter criteria: free text, column filters, chips and sort order.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How free text is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Any string field contains the query
    #[default]
    Plain,
    /// Pattern routing with a fuzzy fallback
    Smart,
}

impl SearchMode {
    pub fn toggle(self) -> Self {
        match self {
            SearchMode::Plain => SearchMode::Smart,
            SearchMode::Smart => SearchMode::Plain,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction: {}", other)),
        }
    }
}

/// Sort key and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Preset creation-date windows ("Last 7 days" and friends).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateRange {
    Last7Days,
    Last30Days,
    Last90Days,
}

impl DateRange {
    pub const ALL: [DateRange; 3] = [DateRange::Last7Days, DateRange::Last30Days, DateRange::Last90Days];

    pub fn days(&self) -> i64 {
        match self {
            DateRange::Last7Days => 7,
            DateRange::Last30Days => 30,
            DateRange::Last90Days => 90,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DateRange::Last7Days => "Last 7 days",
            DateRange::Last30Days => "Last 30 days",
            DateRange::Last90Days => "Last 90 days",
        }
    }

    /// Earliest creation time inside the window.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.days())
    }
}

impl std::str::FromStr for DateRange {
    type Err = String;

    /// Accepts `7`, `7d` or the label text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let days = normalized
            .trim_start_matches("last")
            .trim()
            .trim_end_matches("days")
            .trim_end_matches('d')
            .trim();
        DateRange::ALL
            .into_iter()
            .find(|range| range.days().to_string() == days)
            .ok_or_else(|| format!("unknown date range: {}", s))
    }
}

/// The full set of criteria applied to a record collection.
///
/// An empty criteria set yields the whole collection in its original order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    /// Free-text query; whitespace-only counts as absent
    pub free_text: Option<String>,
    /// Plain or smart matching of `free_text`
    pub mode: SearchMode,
    /// Per-field case-insensitive substring filters
    pub field_filters: BTreeMap<String, String>,
    /// Chip facets: category → accepted values (empty set accepts everything)
    pub chip_filters: BTreeMap<String, BTreeSet<String>>,
    /// Keep only records whose `createdAt` is at or after this instant
    pub created_after: Option<DateTime<Utc>>,
    /// Sort order applied last
    pub sort: Option<SortSpec>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the free-text query.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.free_text = Some(text.into());
        self
    }

    /// Builder: switch to smart search.
    pub fn smart(mut self) -> Self {
        self.mode = SearchMode::Smart;
        self
    }

    /// Builder: add a field filter.
    pub fn with_field(mut self, field: impl Into<String>, needle: impl Into<String>) -> Self {
        self.set_field_filter(field, needle);
        self
    }

    /// Builder: activate a chip.
    pub fn with_chip(mut self, category: impl Into<String>, value: impl Into<String>) -> Self {
        self.chip_filters
            .entry(category.into())
            .or_default()
            .insert(value.into());
        self
    }

    /// Builder: set the sort order.
    pub fn sorted_by(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    /// The trimmed free-text query, if one is present.
    pub fn query(&self) -> Option<&str> {
        self.free_text
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    /// Restrict to records created inside a preset window, or lift the restriction.
    pub fn set_date_range(&mut self, range: Option<DateRange>, now: DateTime<Utc>) {
        self.created_after = range.map(|r| r.cutoff(now));
    }

    /// Set or clear a field filter. An empty needle removes the filter.
    pub fn set_field_filter(&mut self, field: impl Into<String>, needle: impl Into<String>) {
        let field = field.into();
        let needle = needle.into();
        if needle.trim().is_empty() {
            self.field_filters.remove(&field);
        } else {
            self.field_filters.insert(field, needle);
        }
    }

    /// Toggle a chip on or off. Returns whether the chip is now active.
    pub fn toggle_chip(&mut self, category: &str, value: &str) -> bool {
        let set = self.chip_filters.entry(category.to_string()).or_default();
        let active = if set.remove(value) {
            false
        } else {
            set.insert(value.to_string());
            true
        };

        if set.is_empty() {
            self.chip_filters.remove(category);
        }
        active
    }

    /// Number of active chips plus active field filters.
    pub fn active_filter_count(&self) -> usize {
        self.chip_filters.values().map(BTreeSet::len).sum::<usize>() + self.field_filters.len()
    }

    /// Whether nothing narrows or reorders the collection.
    pub fn is_empty(&self) -> bool {
        self.query().is_none()
            && self.field_filters.is_empty()
            && self.chip_filters.values().all(BTreeSet::is_empty)
            && self.created_after.is_none()
            && self.sort.is_none()
    }

    /// Clear every filter but keep the sort order and search mode.
    pub fn clear(&mut self) {
        self.free_text = None;
        self.field_filters.clear();
        self.chip_filters.clear();
        self.created_after = None;
    }
}
