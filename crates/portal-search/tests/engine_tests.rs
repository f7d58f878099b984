//! Filter/sort engine integration tests

mod common;

use chrono::{TimeZone, Utc};
use common::{directory, Contact};
use portal_search::{
    levenshtein, similarity, FilterCriteria, FilterEngine, SearchConfig, SortSpec,
};
use proptest::prelude::*;
use rstest::rstest;

fn engine() -> FilterEngine {
    FilterEngine::new(SearchConfig::default()).unwrap()
}

fn names(visible: &[&Contact]) -> Vec<String> {
    visible.iter().map(|c| c.name.clone()).collect()
}

// === Smart Search ===

#[test]
fn test_email_query_only_checks_email_field() {
    let records = directory();
    let criteria = FilterCriteria::new().with_text("jane@example.com").smart();
    let visible = engine().apply(&records, &criteria);

    assert_eq!(names(&visible), vec!["Jane Doe"]);
}

#[test]
fn test_plain_mode_finds_email_anywhere() {
    let records = directory();
    let criteria = FilterCriteria::new().with_text("jane@example.com");
    let visible = engine().apply(&records, &criteria);

    assert_eq!(visible.len(), 2);
}

#[test]
fn test_in_city_requires_equality() {
    let records = directory();
    let criteria = FilterCriteria::new().with_text("in Seattle").smart();
    let visible = engine().apply(&records, &criteria);

    // "Seattle Heights" is not Seattle; "seattle" is
    assert_eq!(names(&visible), vec!["Jane Doe", "Acme Manufacturing"]);
}

#[rstest]
#[case("vendor", vec!["Example Supplies"])]
#[case("inactive", vec!["jane@example.com Holdings"])]
#[case("206-555-0142", vec!["Acme Manufacturing"])]
#[case("acme manufacturng", vec!["Acme Manufacturing"])]
#[case("portlnd", vec!["Example Supplies"])]
fn test_smart_routes(#[case] query: &str, #[case] expected: Vec<&str>) {
    let records = directory();
    let criteria = FilterCriteria::new().with_text(query).smart();
    let visible = engine().apply(&records, &criteria);

    assert_eq!(names(&visible), expected);
}

#[test]
fn test_every_term_must_match_some_field() {
    let records = directory();
    let criteria = FilterCriteria::new().with_text("acme zzzzzz").smart();
    assert!(engine().apply(&records, &criteria).is_empty());
}

#[test]
fn test_lower_threshold_admits_more() {
    let records = directory();
    let criteria = FilterCriteria::new().with_text("portxxx").smart();

    assert!(engine().apply(&records, &criteria).is_empty());

    let loose = FilterEngine::new(SearchConfig::default().with_threshold(0.5)).unwrap();
    assert_eq!(names(&loose.apply(&records, &criteria)), vec!["Example Supplies"]);
}

// === Filters and Chips ===

#[test]
fn test_chips_and_field_filters_combine() {
    let records = directory();
    let criteria = FilterCriteria::new()
        .with_chip("isActive", "Active")
        .with_field("city", "SEATTLE");
    let visible = engine().apply(&records, &criteria);

    assert_eq!(names(&visible), vec!["Jane Doe", "Acme Manufacturing"]);
}

#[test]
fn test_chip_set_accepts_any_member() {
    let records = directory();
    let criteria = FilterCriteria::new()
        .with_chip("category", "Vendor")
        .with_chip("category", "Customer");
    let visible = engine().apply(&records, &criteria);

    assert_eq!(names(&visible), vec!["Jane Doe", "Example Supplies"]);
}

#[test]
fn test_created_after_cutoff_is_inclusive() {
    let records = directory();
    let mut criteria = FilterCriteria::new();
    criteria.created_after = Some(Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap());
    let visible = engine().apply(&records, &criteria);

    assert_eq!(visible.len(), 2);
}

// === Sorting ===

#[test]
fn test_sort_by_timestamp_desc() {
    let records = directory();
    let criteria = FilterCriteria::new().sorted_by(SortSpec::desc("createdAt"));
    let visible = engine().apply(&records, &criteria);

    assert_eq!(visible[0].name, "Acme Manufacturing");
    assert_eq!(visible[3].name, "Jane Doe");
}

#[test]
fn test_sort_by_status_groups_active_first() {
    let records = directory();
    let criteria = FilterCriteria::new().sorted_by(SortSpec::asc("isActive"));
    let visible = engine().apply(&records, &criteria);

    assert_eq!(visible[3].name, "jane@example.com Holdings");
    // Active records keep their input order
    assert_eq!(
        names(&visible[..3]),
        vec!["Jane Doe", "Example Supplies", "Acme Manufacturing"]
    );
}

#[test]
fn test_empty_collection() {
    let records: Vec<Contact> = Vec::new();
    let criteria = FilterCriteria::new().with_text("x").sorted_by(SortSpec::asc("name"));
    assert!(engine().apply(&records, &criteria).is_empty());
}

// === Property-Based Tests ===

fn arb_contact() -> impl Strategy<Value = Contact> {
    (
        "[a-zA-Z ]{0,8}",
        "[a-z]{1,5}@[a-z]{1,5}\\.com",
        "[a-zA-Z]{0,6}",
        prop::sample::select(vec!["Customer", "Vendor", "Prospect"]),
        any::<bool>(),
        1u32..28,
    )
        .prop_map(|(name, email, city, category, active, day)| {
            let contact = Contact::new(&name, &email, &city, category).created(day);
            if active {
                contact
            } else {
                contact.inactive()
            }
        })
}

fn arb_criteria() -> impl Strategy<Value = FilterCriteria> {
    (
        prop::option::of("[a-z ]{0,4}"),
        any::<bool>(),
        prop::option::of(prop::sample::select(vec!["name", "city", "createdAt", "isActive"])),
        any::<bool>(),
    )
        .prop_map(|(text, smart, sort, desc)| {
            let mut criteria = FilterCriteria::new();
            criteria.free_text = text;
            if smart {
                criteria = criteria.smart();
            }
            if let Some(field) = sort {
                criteria = criteria.sorted_by(if desc {
                    SortSpec::desc(field)
                } else {
                    SortSpec::asc(field)
                });
            }
            criteria
        })
}

proptest! {
    #[test]
    fn test_apply_does_not_mutate_input(
        records in prop::collection::vec(arb_contact(), 0..12),
        criteria in arb_criteria()
    ) {
        let before = records.clone();
        let _ = engine().apply(&records, &criteria);
        prop_assert_eq!(records, before);
    }

    #[test]
    fn test_apply_is_idempotent(
        records in prop::collection::vec(arb_contact(), 0..12),
        criteria in arb_criteria()
    ) {
        let engine = engine();
        let first: Vec<*const Contact> = engine.apply(&records, &criteria).into_iter().map(|c| c as *const _).collect();
        let second: Vec<*const Contact> = engine.apply(&records, &criteria).into_iter().map(|c| c as *const _).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_resorting_is_stable(
        records in prop::collection::vec(arb_contact(), 0..12),
        field in prop::sample::select(vec!["name", "city", "isActive", "createdAt"]),
        desc in any::<bool>()
    ) {
        let sort = if desc { SortSpec::desc(field) } else { SortSpec::asc(field) };
        let criteria = FilterCriteria::new().sorted_by(sort);
        let engine = engine();

        let sorted: Vec<Contact> = engine.apply(&records, &criteria).into_iter().cloned().collect();
        let resorted: Vec<Contact> = engine.apply(&sorted, &criteria).into_iter().cloned().collect();
        prop_assert_eq!(sorted, resorted);
    }

    #[test]
    fn test_empty_criteria_is_identity(records in prop::collection::vec(arb_contact(), 0..12)) {
        let visible: Vec<Contact> = engine().apply(&records, &FilterCriteria::new()).into_iter().cloned().collect();
        prop_assert_eq!(visible, records);
    }

    #[test]
    fn test_levenshtein_agrees_with_strsim(a in "\\PC{0,12}", b in "\\PC{0,12}") {
        prop_assert_eq!(levenshtein(&a, &b), strsim::levenshtein(&a, &b));
    }

    #[test]
    fn test_similarity_bounded(a in "[a-z]{0,10}", b in "[a-z]{0,10}") {
        let score = similarity(&a, &b);
        prop_assert!((0.0..=1.0).contains(&score), "similarity out of range: {}", score);
    }

    #[test]
    fn test_similarity_symmetric(a in "[a-z]{0,10}", b in "[a-z]{0,10}") {
        prop_assert!((similarity(&a, &b) - similarity(&b, &a)).abs() < 1e-12);
    }
}
