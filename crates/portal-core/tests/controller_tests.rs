//! Page controller integration tests

mod common;

use std::path::Path;

use chrono::Duration;
use common::{at, controller, controller_with, load_fixture, row, ten_inactive_parties};
use portal_core::{
    AlwaysConfirm, ExportFormat, FileStore, KeyValueStore, NeverConfirm, PageController,
    PortalConfig, PortalError, RecordRepository, RecordingNotifier, Severity, ViewState,
};
use portal_domain::{is_account_number, DefectGroup, Party, Record, Ticket, TicketStatus};
use portal_search::{DateRange, SearchMode};
use proptest::prelude::*;
use serde_json::json;

// === CRUD ===

#[test]
fn test_create_update_delete_round_trip() {
    let mut parties = controller::<Party>();

    let created = parties
        .create(
            row(json!({"name": "Initech", "partyType": "Customer", "email": "bill@initech.com"})),
            at(2, 9),
        )
        .unwrap();
    assert_eq!(created.id, "P009");
    assert!(parties.visible().iter().any(|p| p.id == "P009"));
    assert_eq!(parties.notifier().last().unwrap().severity, Severity::Success);

    let updated = parties
        .update("P009", row(json!({"email": "peter@initech.com"})), at(3, 9))
        .unwrap();
    assert_eq!(updated.email, "peter@initech.com");
    assert!(updated.updated_at > created.updated_at);

    let mut before = created.to_row().unwrap();
    let mut after = updated.to_row().unwrap();
    for key in ["email", "updatedAt"] {
        before.remove(key);
        after.remove(key);
    }
    assert_eq!(before, after);

    let removed = parties.delete(&["P009".to_string()], &mut AlwaysConfirm).unwrap();
    assert_eq!(removed, 1);
    assert!(parties.collection().get("P009").is_none());
    assert_eq!(parties.records().len(), 8);
}

#[test]
fn test_mutations_are_persisted() {
    let mut parties = controller::<Party>();
    parties
        .create(row(json!({"name": "Initech", "partyType": "Customer"})), at(2, 9))
        .unwrap();

    let stored = parties
        .repository()
        .store()
        .get("parties_user1")
        .unwrap()
        .unwrap();
    assert!(stored.contains("Initech"));
}

#[test]
fn test_invalid_create_is_reported() {
    let mut parties = controller::<Party>();
    let err = parties
        .create(row(json!({"name": "", "email": "nope"})), at(2, 9))
        .unwrap_err();

    match err {
        PortalError::Validation(errors) => {
            assert!(errors.has_field("name"));
            assert!(errors.has_field("partyType"));
            assert!(errors.has_field("email"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(parties.records().len(), 8);
    assert_eq!(parties.notifier().last().unwrap().severity, Severity::Warning);
}

#[test]
fn test_update_missing_record_changes_nothing() {
    let mut groups = controller::<DefectGroup>();
    let before = groups.records().to_vec();

    let err = groups
        .update("DG404", row(json!({"priority": "Low"})), at(2, 9))
        .unwrap_err();
    assert!(matches!(err, PortalError::NotFound { .. }));
    assert_eq!(groups.records(), before.as_slice());
    assert_eq!(
        groups.notifier().last().unwrap().message,
        "Defect group not found: DG404"
    );
}

#[test]
fn test_declined_delete_changes_nothing() {
    let mut groups = controller::<DefectGroup>();
    let err = groups
        .delete(&["DG001".to_string()], &mut NeverConfirm)
        .unwrap_err();

    assert!(matches!(err, PortalError::Declined));
    assert_eq!(groups.records().len(), 8);
    assert_eq!(groups.notifier().last().unwrap().severity, Severity::Info);
}

#[test]
fn test_empty_delete_is_a_no_op() {
    let mut groups = controller::<DefectGroup>();
    assert_eq!(groups.delete(&[], &mut NeverConfirm).unwrap(), 0);
    assert!(groups.notifier().notifications().is_empty());
}

#[test]
fn test_bulk_delete_uses_selection() {
    let mut groups = controller::<DefectGroup>();
    groups.toggle_selection("DG002");
    groups.toggle_selection("DG004");

    let mut prompts = Vec::new();
    let mut gate = |prompt: &str| {
        prompts.push(prompt.to_string());
        true
    };
    assert_eq!(groups.bulk_delete(&mut gate).unwrap(), 2);
    assert_eq!(prompts, vec!["Are you sure you want to delete 2 defect group records?"]);
    assert!(groups.view_state().selection.is_empty());
    assert_eq!(groups.records().len(), 6);
}

// === Bulk status ===

#[test]
fn test_bulk_activate_three_of_ten() {
    let parties = ten_inactive_parties();
    let mut controller = controller_with(Some(parties.as_slice()));
    for id in ["P002", "P005", "P009"] {
        assert!(controller.toggle_selection(id));
    }

    assert_eq!(controller.bulk_activate(at(2, 9)).unwrap(), 3);
    assert!(controller.view_state().selection.is_empty());

    for party in controller.records() {
        let expected = ["P002", "P005", "P009"].contains(&party.id.as_str());
        assert_eq!(party.is_active, expected, "{}", party.id);
        if !expected {
            assert_eq!(party.updated_at, at(1, 8));
        }
    }
}

#[test]
fn test_bulk_deactivate_without_selection_warns() {
    let mut parties = controller::<Party>();
    assert_eq!(parties.bulk_deactivate(at(2, 9)).unwrap(), 0);
    assert_eq!(parties.notifier().last().unwrap().severity, Severity::Warning);
}

#[test]
fn test_unknown_ids_cannot_be_selected() {
    let mut parties = controller::<Party>();
    assert!(!parties.toggle_selection("P999"));
    assert!(parties.view_state().selection.is_empty());
}

proptest! {
    #[test]
    fn prop_bulk_activate_touches_only_selection(picks in prop::collection::btree_set(1usize..=10, 0..=10)) {
        let parties = ten_inactive_parties();
        let mut controller = controller_with(Some(parties.as_slice()));
        for i in &picks {
            controller.toggle_selection(&format!("P{:03}", i));
        }

        controller.bulk_activate(at(2, 9)).unwrap();

        for (i, party) in controller.records().iter().enumerate() {
            prop_assert_eq!(party.is_active, picks.contains(&(i + 1)));
        }
        prop_assert!(controller.view_state().selection.is_empty());
    }
}

// === Tickets ===

#[test]
fn test_status_change_appends_one_history_entry() {
    let mut tickets = controller::<Ticket>();

    let change = tickets
        .change_ticket_status("ticket1", TicketStatus::Resolved, "Support Agent", at(1, 10))
        .unwrap();
    assert_eq!(change.from, TicketStatus::Open);
    assert_eq!(change.to, TicketStatus::Resolved);

    let ticket = tickets.collection().get("ticket1").unwrap();
    assert_eq!(ticket.status_history.len(), 1);
    assert_eq!(ticket.status, TicketStatus::Resolved);
    assert_eq!(
        tickets.notifier().last().unwrap().message,
        "Ticket status updated to Resolved"
    );

    // A skewed clock never moves history backwards
    let second = tickets
        .change_ticket_status("ticket1", TicketStatus::Closed, "Support Agent", at(1, 9))
        .unwrap();
    assert!(second.time >= change.time);
    assert_eq!(
        tickets.collection().get("ticket1").unwrap().status_history.len(),
        2
    );
}

#[test]
fn test_same_status_is_rejected() {
    let mut tickets = controller::<Ticket>();
    let err = tickets
        .change_ticket_status("ticket2", TicketStatus::InProgress, "Agent", at(1, 10))
        .unwrap_err();

    assert!(matches!(err, PortalError::Domain(_)));
    assert!(tickets.collection().get("ticket2").unwrap().status_history.is_empty());
    assert_eq!(tickets.notifier().last().unwrap().severity, Severity::Warning);
}

#[test]
fn test_field_update_cannot_change_ticket_status() {
    let mut tickets = controller::<Ticket>();
    let err = tickets
        .update("ticket1", row(json!({"status": "resolved"})), at(1, 10))
        .unwrap_err();

    let PortalError::Validation(errors) = err else {
        panic!("expected a validation error");
    };
    assert!(errors.has_field("status"));

    let ticket = tickets.collection().get("ticket1").unwrap();
    assert_eq!(ticket.status, TicketStatus::Open);
    assert!(ticket.status_history.is_empty());
}

#[test]
fn test_field_update_cannot_rewrite_history() {
    let mut tickets = controller::<Ticket>();
    tickets
        .change_ticket_status("ticket1", TicketStatus::Closed, "Support Agent", at(1, 10))
        .unwrap();
    let comment_count = tickets.collection().get("ticket1").unwrap().comments.len();

    for patch in [json!({"statusHistory": []}), json!({"comments": null})] {
        let err = tickets.update("ticket1", row(patch), at(1, 11)).unwrap_err();
        assert!(matches!(err, PortalError::Validation(_)));
    }

    let ticket = tickets.collection().get("ticket1").unwrap();
    assert_eq!(ticket.status_history.len(), 1);
    assert_eq!(ticket.comments.len(), comment_count);

    // Other fields still update normally
    let updated = tickets
        .update("ticket1", row(json!({"title": "Settings page blank"})), at(1, 12))
        .unwrap();
    assert_eq!(updated.title, "Settings page blank");
    assert_eq!(updated.status_history.len(), 1);
}

#[test]
fn test_add_ticket_comment() {
    let mut tickets = controller::<Ticket>();
    let comment = tickets
        .add_ticket_comment("ticket3", "John Doe", "  Still confused  ", at(1, 10))
        .unwrap();
    assert_eq!(comment.text, "Still confused");
    assert_eq!(tickets.collection().get("ticket3").unwrap().updated, at(1, 10));

    assert!(tickets
        .add_ticket_comment("ticket3", "John Doe", "   ", at(1, 11))
        .is_err());
    assert!(matches!(
        tickets.add_ticket_comment("ticket9", "John Doe", "hi", at(1, 11)),
        Err(PortalError::NotFound { .. })
    ));
}

#[test]
fn test_ticket_date_range_chip() {
    let mut tickets = controller::<Ticket>();
    tickets.set_date_range(Some(DateRange::Last7Days), at(1, 10));
    let ids: Vec<&str> = tickets.visible().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["ticket1", "ticket2", "ticket3"]);

    tickets.set_date_range(None, at(1, 10));
    assert_eq!(tickets.visible().len(), 4);
}

// === Search and paging ===

#[test]
fn test_smart_search_through_controller() {
    let mut parties = controller::<Party>();
    assert_eq!(parties.toggle_smart_search(), SearchMode::Smart);

    parties.search_now("jane@globalsupplies.com");
    let visible = parties.visible();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, "P002");

    parties.clear_filters();
    assert_eq!(parties.visible().len(), 8);
    assert_eq!(parties.view_state().criteria.mode, SearchMode::Smart);
}

#[test]
fn test_smart_city_search_ignores_trailing_words() {
    let mut parties = controller::<Party>();
    parties.set_mode(SearchMode::Smart);

    parties.search_now("in Seattle today");
    let ids: Vec<&str> = parties.visible().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["P007"]);
}

#[test]
fn test_page_view_of_sorted_groups() {
    let mut groups = controller::<DefectGroup>();
    groups.sort_by("code");
    let view = groups.page_view(at(1, 9));

    assert_eq!(view.rows.len(), 8);
    assert_eq!(view.rows[0].subtitle, "BRK001");
    assert_eq!(view.summary, "Showing 1 to 8 of 8 results");
    assert_eq!(view.page_numbers, vec![1]);
    assert_eq!(view.stats.inactive, 2);

    assert_eq!(groups.go_to_page(5), 1);
}

#[test]
fn test_view_state_restore_drops_unknown_selection() {
    let mut groups = controller::<DefectGroup>();
    let mut state = ViewState::new();
    state.selection.select("DG001");
    state.selection.select("DG404");
    state.page = 7;

    groups.restore_view_state(state);
    assert_eq!(groups.view_state().selection.ids(), ["DG001"]);
    assert_eq!(groups.view_state().page, 1);
}

// === Import / export ===

#[test]
fn test_import_csv_fixture() {
    let mut parties = controller::<Party>();
    let count = parties
        .import(Path::new("parties.csv"), &load_fixture("parties.csv"), at(2, 9))
        .unwrap();
    assert_eq!(count, 3);

    let contoso = parties.collection().get("P010").unwrap();
    assert_eq!(contoso.name, "Contoso Parts");
    assert!(!contoso.is_active);

    let fabrikam = parties.collection().get("P011").unwrap();
    assert!(fabrikam.is_active);
    assert_eq!(fabrikam.company, "Unknown Company");
    assert!(is_account_number(&fabrikam.account_number));
    assert_eq!(
        parties.notifier().last().unwrap().message,
        "Successfully imported 3 party records"
    );
}

#[test]
fn test_import_json_fixture() {
    let mut groups = controller::<DefectGroup>();
    groups
        .import(
            Path::new("defect_groups.json"),
            &load_fixture("defect_groups.json"),
            at(2, 9),
        )
        .unwrap();

    let paint = groups.collection().get("DG009").unwrap();
    assert_eq!(paint.description, "Paint defect group");
    let welding = groups.collection().get("77").unwrap();
    assert_eq!(welding.priority, "High");
    assert!(!welding.is_active);
}

#[test]
fn test_failed_import_leaves_collection() {
    let mut parties = controller::<Party>();

    let err = parties
        .import(Path::new("parties.xlsx"), "anything", at(2, 9))
        .unwrap_err();
    assert!(matches!(err, PortalError::Import(_)));

    assert!(parties
        .import(Path::new("parties.json"), "[{\"name\": ", at(2, 9))
        .is_err());
    assert_eq!(parties.records().len(), 8);
    assert_eq!(parties.notifier().last().unwrap().severity, Severity::Error);
}

#[test]
fn test_export_filtered_view() {
    let mut parties = controller::<Party>();
    parties.search_now("seattle");

    let csv = parties.export(ExportFormat::Csv).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("id,partyType,name,accountNumber"));
    assert!(lines[1].starts_with("P007,Prospect,Future Client LLC,741-852-9630"));

    let json = parties.export(ExportFormat::Json).unwrap();
    let parsed: Vec<Party> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.len(), 1);
}

// === File store ===

#[test]
fn test_file_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = PortalConfig::default();

    {
        let repository = RecordRepository::new(FileStore::open(dir.path()).unwrap(), "user1");
        let mut groups: PageController<DefectGroup, _, _> =
            PageController::new(&config, repository, RecordingNotifier::new()).unwrap();
        groups.load(at(1, 9)).unwrap();
        groups
            .create(
                row(json!({"code": "WLD001", "defectGroup": "Welding", "category": "Assembly"})),
                at(1, 10),
            )
            .unwrap();
    }

    assert!(dir.path().join("defectGroups_user1.json").exists());

    let repository = RecordRepository::new(FileStore::open(dir.path()).unwrap(), "user1");
    let mut groups: PageController<DefectGroup, _, _> =
        PageController::new(&config, repository, RecordingNotifier::new()).unwrap();
    assert_eq!(groups.load(at(2, 9)).unwrap(), 9);
    assert_eq!(groups.collection().get("DG009").unwrap().code, "WLD001");
}

#[test]
fn test_malformed_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("tickets_user1.json"), "not json").unwrap();

    let repository = RecordRepository::new(FileStore::open(dir.path()).unwrap(), "user1");
    let mut tickets: PageController<Ticket, _, _> =
        PageController::new(&PortalConfig::default(), repository, RecordingNotifier::new()).unwrap();

    assert!(matches!(tickets.load(at(1, 9)), Err(PortalError::Storage(_))));
    assert_eq!(tickets.notifier().last().unwrap().severity, Severity::Error);
    assert!(tickets.records().is_empty());
}

#[test]
fn test_thirty_day_range_keeps_all_default_tickets() {
    let mut tickets = controller::<Ticket>();
    let now = at(1, 9) + Duration::hours(1);
    tickets.set_date_range(Some(DateRange::Last30Days), now);
    assert_eq!(tickets.visible().len(), 4);
}
