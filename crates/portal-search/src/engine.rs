//! The filter/sort pipeline.
//!
//! ```text
//! records ─▶ free text ─▶ field filters ─▶ chips ─▶ created_after ─▶ stable sort ─▶ visible
//! ```
//!
//! The engine only borrows its input; the visible view is a list of
//! references into the caller's collection.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::{SearchConfig, SearchConfigError};
use crate::criteria::{FilterCriteria, SearchMode, SortDirection, SortSpec};
use crate::searchable::{FieldValue, Searchable};
use crate::smart::{SmartClassifier, SmartQuery};

/// Field holding a record's creation time.
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Applies [`FilterCriteria`] to record collections.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    config: SearchConfig,
    classifier: SmartClassifier,
}

impl FilterEngine {
    /// Build an engine from a validated configuration.
    pub fn new(config: SearchConfig) -> Result<Self, SearchConfigError> {
        config.validate()?;
        let classifier = SmartClassifier::new(&config)?;
        Ok(Self { config, classifier })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn classifier(&self) -> &SmartClassifier {
        &self.classifier
    }

    /// Compute the visible, ordered subset of `records`.
    pub fn apply<'a, T: Searchable>(
        &self,
        records: &'a [T],
        criteria: &FilterCriteria,
    ) -> Vec<&'a T> {
        let text = criteria.query().map(|q| self.text_matcher(q, criteria.mode));

        let mut visible: Vec<&T> = records
            .iter()
            .filter(|r| text.as_ref().map_or(true, |m| m.matches(*r)))
            .filter(|r| passes_field_filters(*r, criteria))
            .filter(|r| passes_chip_filters(*r, criteria))
            .filter(|r| created_after(*r, criteria.created_after))
            .collect();

        if let Some(sort) = &criteria.sort {
            sort_records(&mut visible, sort);
        }

        debug!(
            total = records.len(),
            visible = visible.len(),
            mode = ?criteria.mode,
            "Applied filter criteria"
        );

        visible
    }

    fn text_matcher(&self, query: &str, mode: SearchMode) -> TextMatcher {
        match mode {
            SearchMode::Plain => TextMatcher::Plain(query.to_lowercase()),
            SearchMode::Smart => {
                let classified = self.classifier.classify(query);
                debug!(?classified, "Classified smart query");
                TextMatcher::Smart(classified, self.config.fuzzy_threshold)
            }
        }
    }
}

/// Free-text query prepared once per `apply` call.
enum TextMatcher {
    Plain(String),
    Smart(SmartQuery, f64),
}

impl TextMatcher {
    fn matches<T: Searchable>(&self, record: &T) -> bool {
        match self {
            TextMatcher::Plain(needle) => record
                .text_fields()
                .iter()
                .any(|f| f.to_lowercase().contains(needle.as_str())),
            TextMatcher::Smart(query, threshold) => query.matches(record, *threshold),
        }
    }
}

fn display_lower<T: Searchable>(record: &T, field: &str) -> String {
    record
        .field(field)
        .map(|v| v.display_text().to_lowercase())
        .unwrap_or_default()
}

fn passes_field_filters<T: Searchable>(record: &T, criteria: &FilterCriteria) -> bool {
    criteria.field_filters.iter().all(|(field, needle)| {
        display_lower(record, field).contains(needle.trim().to_lowercase().as_str())
    })
}

fn passes_chip_filters<T: Searchable>(record: &T, criteria: &FilterCriteria) -> bool {
    criteria.chip_filters.iter().all(|(category, values)| {
        if values.is_empty() {
            return true;
        }
        let value = record
            .field(category)
            .map(|v| v.display_text().into_owned())
            .unwrap_or_default();
        values.contains(&value)
    })
}

fn created_after<T: Searchable>(record: &T, cutoff: Option<DateTime<Utc>>) -> bool {
    let Some(cutoff) = cutoff else {
        return true;
    };
    match record.field(CREATED_AT_FIELD) {
        Some(FieldValue::Timestamp(created)) => created >= cutoff,
        Some(FieldValue::Text(text)) => DateTime::parse_from_rfc3339(&text)
            .map(|created| created.with_timezone(&Utc) >= cutoff)
            .unwrap_or(false),
        _ => false,
    }
}

/// Stable sort in place. Unknown fields leave the order untouched.
///
/// Text keys go through [`compare_text`](crate::searchable::compare_text):
/// case-insensitive code point order rather than locale collation.
pub fn sort_records<T: Searchable>(records: &mut [&T], sort: &SortSpec) {
    if !T::has_field(&sort.field) {
        debug!(field = %sort.field, "Ignoring sort on unknown field");
        return;
    }

    let empty = FieldValue::text("");
    records.sort_by(|a, b| {
        let left = a.field(&sort.field);
        let right = b.field(&sort.field);
        let ordering = left
            .as_ref()
            .unwrap_or(&empty)
            .sort_cmp(right.as_ref().unwrap_or(&empty));
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}
