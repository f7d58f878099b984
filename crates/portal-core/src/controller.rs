//! One controller per page instance.
//!
//! ```text
//!  keystrokes ─▶ Debouncer ─▶ ViewState.criteria ─┐
//!                                                 ├─▶ FilterEngine ─▶ PageView
//!  RecordRepository ─▶ RecordCollection ──────────┘
//!        ▲                    │
//!        └──── save ◀─────────┴─ create / update / delete / bulk / import
//! ```
//!
//! Every mutation is persisted and reported through the [`Notifier`];
//! rejected mutations are reported and leave the collection unchanged.

use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use portal_domain::{Activatable, Comment, Record, Row, StatusChange, Ticket, TicketStatus};
use portal_search::{DateRange, FilterEngine, SearchMode, SortSpec};

use crate::collection::RecordCollection;
use crate::config::{ConfigError, PagingConfig, PortalConfig};
use crate::confirm::ConfirmationGate;
use crate::debounce::Debouncer;
use crate::error::{PortalError, Result};
use crate::interchange::{self, ExportFormat, ImportFormat};
use crate::notify::{Notifier, Severity};
use crate::store::{KeyValueStore, RecordRepository};
use crate::view_model::{page_count, PageView, Presentable};
use crate::view_state::ViewState;

/// Owns a page's records, view state, storage and notifications.
pub struct PageController<T, S, N> {
    collection: RecordCollection<T>,
    view: ViewState,
    repository: RecordRepository<S>,
    notifier: N,
    engine: FilterEngine,
    search: Debouncer<String>,
    paging: PagingConfig,
}

impl<T, S, N> PageController<T, S, N>
where
    T: Presentable,
    S: KeyValueStore,
    N: Notifier,
{
    /// Build an empty controller; call [`load`](Self::load) to read records.
    pub fn new(config: &PortalConfig, repository: RecordRepository<S>, notifier: N) -> Result<Self> {
        config.validate()?;
        let engine = FilterEngine::new(config.search.clone()).map_err(ConfigError::from)?;

        Ok(Self {
            collection: RecordCollection::default(),
            view: ViewState::new(),
            repository,
            notifier,
            engine,
            search: Debouncer::new(config.debounce.quiet_period()),
            paging: config.paging.clone(),
        })
    }

    pub fn collection(&self) -> &RecordCollection<T> {
        &self.collection
    }

    pub fn records(&self) -> &[T] {
        self.collection.records()
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    /// Restore a previously saved view state.
    pub fn restore_view_state(&mut self, state: ViewState) {
        self.view = state;
        self.refresh_view();
    }

    pub fn repository(&self) -> &RecordRepository<S> {
        &self.repository
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    /// Read the stored collection (or the default dataset).
    pub fn load(&mut self, now: DateTime<Utc>) -> Result<usize> {
        match self.repository.load::<T>(now) {
            Ok(records) => {
                self.collection = RecordCollection::new(records);
                self.refresh_view();
                info!(entity = T::ENTITY, count = self.collection.len(), "Loaded page");
                Ok(self.collection.len())
            }
            Err(err) => {
                let err = PortalError::from(err);
                self.report(&err);
                Err(err)
            }
        }
    }

    // === Search and filters ===

    /// Record a keystroke; the query is applied once typing pauses.
    pub fn set_query(&mut self, text: impl Into<String>, at: Instant) {
        self.search.schedule(text.into(), at);
    }

    /// Apply a pending query if its quiet period has elapsed.
    ///
    /// Returns whether the visible set may have changed.
    pub fn tick(&mut self, at: Instant) -> bool {
        match self.search.poll(at) {
            Some(text) => {
                self.apply_query(text);
                true
            }
            None => false,
        }
    }

    /// Apply `text` immediately, dropping any pending keystrokes.
    pub fn search_now(&mut self, text: impl Into<String>) {
        self.search.cancel();
        self.apply_query(text.into());
    }

    pub fn has_pending_search(&self) -> bool {
        self.search.is_pending()
    }

    fn apply_query(&mut self, text: String) {
        debug!(entity = T::ENTITY, query = %text, "Applying search");
        self.view.criteria.free_text = Some(text).filter(|t| !t.trim().is_empty());
        self.view.reset_page();
    }

    pub fn set_mode(&mut self, mode: SearchMode) {
        self.view.criteria.mode = mode;
        self.view.reset_page();
    }

    /// Flip between plain and smart search.
    pub fn toggle_smart_search(&mut self) -> SearchMode {
        let mode = self.view.criteria.mode.toggle();
        self.set_mode(mode);
        mode
    }

    pub fn set_field_filter(&mut self, field: &str, needle: &str) {
        self.view.criteria.set_field_filter(field, needle);
        self.view.reset_page();
    }

    /// Toggle a chip. Returns whether it is now active.
    pub fn toggle_chip(&mut self, category: &str, value: &str) -> bool {
        let active = self.view.criteria.toggle_chip(category, value);
        self.view.reset_page();
        active
    }

    pub fn set_created_after(&mut self, cutoff: Option<DateTime<Utc>>) {
        self.view.criteria.created_after = cutoff;
        self.view.reset_page();
    }

    /// Apply one of the "Last N days" chips, or lift the date restriction.
    pub fn set_date_range(&mut self, range: Option<DateRange>, now: DateTime<Utc>) {
        self.view.criteria.set_date_range(range, now);
        self.view.reset_page();
    }

    /// Sort by `field`; sorting by the current field again flips direction.
    pub fn sort_by(&mut self, field: &str) -> SortSpec {
        let sort = match &self.view.criteria.sort {
            Some(current) if current.field == field => SortSpec {
                field: current.field.clone(),
                direction: current.direction.toggle(),
            },
            _ => SortSpec::asc(field),
        };
        self.view.criteria.sort = Some(sort.clone());
        sort
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.view.criteria.sort = sort;
    }

    /// Clear every filter and the query; the sort order is kept.
    pub fn clear_filters(&mut self) {
        self.search.cancel();
        self.view.criteria.clear();
        self.view.reset_page();
    }

    /// The filtered, sorted records.
    pub fn visible(&self) -> Vec<&T> {
        self.engine.apply(self.collection.records(), &self.view.criteria)
    }

    pub fn page_view(&self, now: DateTime<Utc>) -> PageView {
        let visible = self.visible();
        PageView::build(&visible, self.collection.records(), self.view.page, &self.paging, now)
    }

    /// Jump to `page`, clamped to the available pages.
    pub fn go_to_page(&mut self, page: usize) -> usize {
        self.view.page = page;
        self.clamp_page();
        self.view.page
    }

    pub fn next_page(&mut self) -> usize {
        self.go_to_page(self.view.page + 1)
    }

    pub fn previous_page(&mut self) -> usize {
        self.go_to_page(self.view.page.saturating_sub(1))
    }

    fn clamp_page(&mut self) {
        let count = page_count(self.visible().len(), self.paging.page_size);
        self.view.clamp_page(count);
    }

    // === Selection ===

    pub fn toggle_selection(&mut self, id: &str) -> bool {
        if !self.collection.contains(id) {
            return false;
        }
        self.view.selection.toggle(id)
    }

    /// Select every visible record.
    pub fn select_all_visible(&mut self) -> usize {
        let ids: Vec<String> = self.visible().iter().map(|r| r.id().to_string()).collect();
        self.view.selection.select_all(ids);
        self.view.selection.len()
    }

    pub fn clear_selection(&mut self) {
        self.view.selection.clear();
    }

    fn refresh_view(&mut self) {
        let known: Vec<String> = self.collection.ids().map(str::to_string).collect();
        self.view.selection.retain_known(known.iter().map(String::as_str));
        self.clamp_page();
    }

    // === Mutations ===

    /// Create a record from form fields.
    pub fn create(&mut self, fields: Row, now: DateTime<Utc>) -> Result<T> {
        let result = self.collection.create(fields, now).cloned();
        let record = self.settle(result)?;
        self.notifier
            .notify(&format!("{} created successfully", T::LABEL), Severity::Success);
        Ok(record)
    }

    /// Overwrite the supplied fields of one record.
    pub fn update(&mut self, id: &str, patch: Row, now: DateTime<Utc>) -> Result<T> {
        let result = self.collection.update(id, patch, now).cloned();
        let record = self.settle(result)?;
        self.notifier
            .notify(&format!("{} updated successfully", T::LABEL), Severity::Success);
        Ok(record)
    }

    /// Delete records by id after confirmation.
    pub fn delete<G>(&mut self, ids: &[String], gate: &mut G) -> Result<usize>
    where
        G: ConfirmationGate + ?Sized,
    {
        let result = self.collection.delete(ids, gate);
        let removed = self.settle(result)?;
        if removed > 0 {
            self.notifier.notify(
                &format!("{} {} deleted", removed, records_word(T::LABEL, removed)),
                Severity::Success,
            );
        }
        Ok(removed)
    }

    /// Delete the selected records after confirmation.
    pub fn bulk_delete<G>(&mut self, gate: &mut G) -> Result<usize>
    where
        G: ConfirmationGate + ?Sized,
    {
        let ids = self.view.selection.ids().to_vec();
        let removed = self.delete(&ids, gate)?;
        self.view.selection.clear();
        Ok(removed)
    }

    /// Import a `.json` or `.csv` file's contents.
    ///
    /// On any failure the collection is left untouched.
    pub fn import(&mut self, file_name: &Path, text: &str, now: DateTime<Utc>) -> Result<usize> {
        let result = ImportFormat::from_path(file_name)
            .and_then(|format| interchange::parse_rows(text, format))
            .map_err(PortalError::from)
            .and_then(|rows| self.collection.merge_imported(rows, now));
        let count = self.settle(result)?;
        self.notifier.notify(
            &format!("Successfully imported {} {}", count, records_word(T::LABEL, count)),
            Severity::Success,
        );
        Ok(count)
    }

    /// Read and import a file from disk.
    pub fn import_file(&mut self, path: &Path, now: DateTime<Utc>) -> Result<usize> {
        match std::fs::read_to_string(path) {
            Ok(text) => self.import(path, &text, now),
            Err(e) => {
                let err = PortalError::Storage(e.into());
                self.report(&err);
                Err(err)
            }
        }
    }

    /// Serialize the visible records.
    pub fn export(&mut self, format: ExportFormat) -> Result<String> {
        let (result, count) = {
            let visible = self.visible();
            (interchange::export(&visible, format), visible.len())
        };

        match result {
            Ok(text) => {
                self.notifier.notify(
                    &format!("Exported {} {}", count, records_word(T::LABEL, count)),
                    Severity::Info,
                );
                Ok(text)
            }
            Err(err) => {
                let err = PortalError::from(err);
                self.report(&err);
                Err(err)
            }
        }
    }

    /// Persist after a successful mutation, or report the failure.
    fn settle<R>(&mut self, result: Result<R>) -> Result<R> {
        let outcome = result.and_then(|value| {
            self.repository.save(self.collection.records())?;
            Ok(value)
        });

        match outcome {
            Ok(value) => {
                self.refresh_view();
                Ok(value)
            }
            Err(err) => {
                self.report(&err);
                Err(err)
            }
        }
    }

    fn report(&mut self, err: &PortalError) {
        let severity = match err {
            PortalError::Declined => Severity::Info,
            PortalError::NotFound { .. } | PortalError::Validation(_) | PortalError::Domain(_) => {
                Severity::Warning
            }
            _ => Severity::Error,
        };
        warn!(entity = T::ENTITY, error = %err, "Operation rejected");
        self.notifier.notify(&err.to_string(), severity);
    }
}

impl<T, S, N> PageController<T, S, N>
where
    T: Presentable + Activatable,
    S: KeyValueStore,
    N: Notifier,
{
    /// Mark every selected record active and clear the selection.
    pub fn bulk_activate(&mut self, now: DateTime<Utc>) -> Result<usize> {
        self.bulk_set_active(true, now)
    }

    /// Mark every selected record inactive and clear the selection.
    pub fn bulk_deactivate(&mut self, now: DateTime<Utc>) -> Result<usize> {
        self.bulk_set_active(false, now)
    }

    fn bulk_set_active(&mut self, active: bool, now: DateTime<Utc>) -> Result<usize> {
        if self.view.selection.is_empty() {
            self.notifier
                .notify("Please select at least one item", Severity::Warning);
            return Ok(0);
        }

        let changed = self
            .collection
            .set_active(&mut self.view.selection, active, now);
        let changed = self.settle(Ok(changed))?;

        let verb = if active { "activated" } else { "deactivated" };
        self.notifier.notify(
            &format!("{} {} {}", changed, records_word(T::LABEL, changed), verb),
            Severity::Success,
        );
        Ok(changed)
    }
}

impl<S, N> PageController<Ticket, S, N>
where
    S: KeyValueStore,
    N: Notifier,
{
    /// Move a ticket to `to`, appending one history entry.
    pub fn change_ticket_status(
        &mut self,
        id: &str,
        to: TicketStatus,
        changed_by: &str,
        now: DateTime<Utc>,
    ) -> Result<StatusChange> {
        let result = self
            .collection
            .update_with(id, now, |ticket| {
                Ok(ticket.transition_to(to, changed_by, now)?.clone())
            })
            .map(|(_, change)| change);
        let change = self.settle(result)?;

        self.notifier.notify(
            &format!("Ticket status updated to {}", to.label()),
            Severity::Success,
        );
        Ok(change)
    }

    /// Add a user comment to a ticket.
    pub fn add_ticket_comment(
        &mut self,
        id: &str,
        author: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Comment> {
        let result = self
            .collection
            .update_with(id, now, |ticket| Ok(ticket.add_comment(author, text, now)?.clone()))
            .map(|(_, comment)| comment);
        let comment = self.settle(result)?;

        self.notifier.notify("Comment added", Severity::Success);
        Ok(comment)
    }
}

fn records_word(label: &str, count: usize) -> String {
    if count == 1 {
        format!("{} record", label.to_lowercase())
    } else {
        format!("{} records", label.to_lowercase())
    }
}
