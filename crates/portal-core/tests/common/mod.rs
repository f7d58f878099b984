//! Shared controller fixtures

#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use portal_core::{MemoryStore, PageController, PortalConfig, RecordRepository, RecordingNotifier};
use portal_domain::{Party, Record, Row};
use serde_json::Value;

pub type Controller<T> = PageController<T, MemoryStore, RecordingNotifier>;

/// A fixed clock reading.
pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
}

/// Get the path to a fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_fixtures")
        .join(name)
}

/// Load a fixture file as a string
pub fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", name))
}

/// Build a JSON row from a `json!` object literal.
pub fn row(value: Value) -> Row {
    value.as_object().cloned().expect("fixture row must be an object")
}

/// Controller over the default dataset of `T`.
pub fn controller<T: portal_core::Presentable>() -> Controller<T> {
    controller_with::<T>(None)
}

/// Controller whose store already holds `records`.
pub fn controller_with<T: portal_core::Presentable>(records: Option<&[T]>) -> Controller<T> {
    let mut repository = RecordRepository::new(MemoryStore::new(), "user1");
    if let Some(records) = records {
        repository.save(records).unwrap();
    }
    let mut controller =
        PageController::new(&PortalConfig::default(), repository, RecordingNotifier::new()).unwrap();
    controller.load(at(1, 9)).unwrap();
    controller
}

/// Ten inactive parties, P001 through P010.
pub fn ten_inactive_parties() -> Vec<Party> {
    (1..=10)
        .map(|i| {
            let mut party = Party::new(format!("Party {}", i), "Customer");
            party.set_id(format!("P{:03}", i));
            party.is_active = false;
            party.created_at = at(1, 8);
            party.updated_at = at(1, 8);
            party
        })
        .collect()
}
