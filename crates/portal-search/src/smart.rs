//! Pattern-first classification of free-text queries.
//!
//! A smart query is tested against a fixed sequence of patterns. The first
//! pattern that matches decides which single field the query is compared
//! with:
//!
//! ```text
//! jane@example.com     → email field contains the query
//! +1 (555) 123-4567    → phone digits contain the query digits
//! in seattle           → city field equals "seattle"
//! vendor               → category field contains "vendor"
//! inactive             → status flag is false
//! acme corp            → every term fuzzy-matches some searchable field
//! ```

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::{SearchConfig, SearchConfigError};
use crate::fuzzy::is_fuzzy_match;
use crate::searchable::{FieldValue, Searchable, SmartTarget};

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap();
    static ref PHONE_PATTERN: Regex = Regex::new(r"\+?[1-9]?[\d\s\-()]{7,}").unwrap();
    static ref CITY_PATTERN: Regex = Regex::new(r"(?i)\bin\s+(\w+)").unwrap();
    static ref STATUS_PATTERN: Regex = Regex::new(r"(?i)\b(inactive|active)\b").unwrap();
}

/// The targeted comparison a smart query was routed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmartQuery {
    /// Email-shaped query, compared against the email field only
    Email(String),
    /// Phone-shaped query, reduced to its digits
    Phone(String),
    /// `in <city>` query; only the word right after `in` is the city
    City(String),
    /// A configured category keyword
    Category(String),
    /// `active` / `inactive`
    Status(bool),
    /// No pattern matched: whitespace-separated terms for fuzzy matching
    Terms(Vec<String>),
}

impl SmartQuery {
    /// Test a record against this classified query.
    pub fn matches<T: Searchable>(&self, record: &T, fuzzy_threshold: f64) -> bool {
        match self {
            SmartQuery::Email(email) => smart_text(record, SmartTarget::Email)
                .map(|value| value.contains(email.as_str()))
                .unwrap_or(false),
            SmartQuery::Phone(digits) => smart_text(record, SmartTarget::Phone)
                .map(|value| digits_of(&value).contains(digits.as_str()))
                .unwrap_or(false),
            SmartQuery::City(city) => smart_text(record, SmartTarget::City)
                .map(|value| value == *city)
                .unwrap_or(false),
            SmartQuery::Category(keyword) => smart_text(record, SmartTarget::Category)
                .map(|value| value.contains(keyword.as_str()))
                .unwrap_or(false),
            SmartQuery::Status(wanted) => match record.smart_field(SmartTarget::Status) {
                Some(FieldValue::Bool(active)) => active == *wanted,
                Some(other) => {
                    other.display_text().to_lowercase()
                        == crate::searchable::status_label(*wanted).to_lowercase()
                }
                None => false,
            },
            SmartQuery::Terms(terms) => {
                let fields: Vec<String> = record
                    .fuzzy_fields()
                    .iter()
                    .map(|f| f.to_lowercase())
                    .collect();

                terms.iter().all(|term| {
                    fields.iter().any(|field| {
                        field.contains(term.as_str()) || is_fuzzy_match(field, term, fuzzy_threshold)
                    })
                })
            }
        }
    }
}

/// Lower-cased display text of the field a smart target routes to.
fn smart_text<T: Searchable>(record: &T, target: SmartTarget) -> Option<String> {
    record
        .smart_field(target)
        .map(|value| value.display_text().to_lowercase())
}

fn digits_of(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Classifies free-text queries into [`SmartQuery`] routes.
#[derive(Debug, Clone)]
pub struct SmartClassifier {
    category_pattern: Regex,
}

impl SmartClassifier {
    /// Build a classifier for the configured category keywords.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchConfigError> {
        let keywords: Vec<String> = config
            .category_keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect();

        if keywords.is_empty() {
            return Err(SearchConfigError::NoCategoryKeywords);
        }

        let pattern = format!(r"(?i)\b({})", keywords.join("|"));
        let category_pattern =
            Regex::new(&pattern).map_err(|e| SearchConfigError::InvalidKeyword(e.to_string()))?;

        Ok(Self { category_pattern })
    }

    /// Classify a query. The first matching pattern wins.
    pub fn classify(&self, query: &str) -> SmartQuery {
        let query = query.trim().to_lowercase();

        if EMAIL_PATTERN.is_match(&query) {
            return SmartQuery::Email(query);
        }

        if PHONE_PATTERN.is_match(&query) {
            let digits = digits_of(&query);
            if !digits.is_empty() {
                return SmartQuery::Phone(digits);
            }
        }

        if let Some(caps) = CITY_PATTERN.captures(&query) {
            return SmartQuery::City(caps[1].to_string());
        }

        if let Some(caps) = self.category_pattern.captures(&query) {
            return SmartQuery::Category(caps[1].to_string());
        }

        if let Some(caps) = STATUS_PATTERN.captures(&query) {
            return SmartQuery::Status(&caps[1] == "active");
        }

        SmartQuery::Terms(query.split_whitespace().map(String::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn classifier() -> SmartClassifier {
        SmartClassifier::new(&SearchConfig::default()).unwrap()
    }

    #[rstest]
    #[case("jane@example.com", SmartQuery::Email("jane@example.com".into()))]
    #[case("+1 (555) 123-4567", SmartQuery::Phone("15551234567".into()))]
    #[case("555-1234", SmartQuery::Phone("5551234".into()))]
    #[case("in Seattle", SmartQuery::City("seattle".into()))]
    #[case("parties in  New   York", SmartQuery::City("new".into()))]
    #[case("in Seattle today", SmartQuery::City("seattle".into()))]
    #[case("Vendor", SmartQuery::Category("vendor".into()))]
    #[case("customers", SmartQuery::Category("customer".into()))]
    #[case("inactive", SmartQuery::Status(false))]
    #[case("active", SmartQuery::Status(true))]
    #[case("acme corp", SmartQuery::Terms(vec!["acme".into(), "corp".into()]))]
    fn classify_cases(#[case] query: &str, #[case] expected: SmartQuery) {
        let classifier = classifier();
        assert_eq!(classifier.classify(query), expected);
    }

    #[test]
    fn email_wins_over_later_patterns() {
        // Contains "in " and "active" but is email-shaped first
        let classifier = classifier();
        assert!(matches!(
            classifier.classify("active.in.sales@vendor.com"),
            SmartQuery::Email(_)
        ));
    }

    #[test]
    fn spaces_alone_are_not_a_phone_number() {
        let classifier = classifier();
        assert!(matches!(
            classifier.classify("a        b"),
            SmartQuery::Terms(_)
        ));
    }

    #[test]
    fn in_requires_word_boundary() {
        let classifier = classifier();
        // "maintain xyz" must not be read as a city lookup
        assert_eq!(
            classifier.classify("maintain xyz"),
            SmartQuery::Terms(vec!["maintain".into(), "xyz".into()])
        );
    }

    #[test]
    fn custom_keywords() {
        let config = SearchConfig::default().with_keywords(["safety", "mechanical"]);
        let classifier = SmartClassifier::new(&config).unwrap();
        assert_eq!(
            classifier.classify("Mechanical"),
            SmartQuery::Category("mechanical".into())
        );
        assert!(matches!(classifier.classify("vendor"), SmartQuery::Terms(_)));
    }
}
