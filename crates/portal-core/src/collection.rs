//! In-memory record collections with CRUD and bulk operations.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

use portal_domain::{normalize_row, Activatable, Record, Row, ValidationErrors};

use crate::confirm::{delete_prompt, ConfirmationGate};
use crate::error::{ImportError, PortalError, Result};
use crate::selection::Selection;

/// Field name reported when a submitted row cannot be read at all.
pub const FORM_FIELD: &str = "form";

/// The full, ordered collection behind one page.
#[derive(Debug, Clone)]
pub struct RecordCollection<T> {
    records: Vec<T>,
}

impl<T> Default for RecordCollection<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<T: Record> RecordCollection<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn into_records(self) -> Vec<T> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.id())
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| PortalError::not_found(T::LABEL, id))
    }

    /// Create a record from submitted form fields.
    ///
    /// Defaults fill unspecified optional fields, a fresh id is assigned
    /// (any submitted id is ignored) and the record is validated against the
    /// collection before it is appended.
    pub fn create(&mut self, fields: Row, now: DateTime<Utc>) -> Result<&T> {
        let mut row = fields;
        normalize_row(&mut row);
        row.remove("id");
        T::apply_defaults(&mut row);

        let mut record = T::from_row(row).map_err(form_error)?;
        record.set_id(T::generate_id(&self.records));
        record.stamp_created(now);
        record.validate(&self.records)?;

        info!(entity = T::ENTITY, id = record.id(), "Created record");
        self.records.push(record);
        Ok(&self.records[self.records.len() - 1])
    }

    /// Append an already-built record.
    ///
    /// A blank or already-used id is replaced by a fresh one.
    pub fn insert(&mut self, mut record: T, now: DateTime<Utc>) -> Result<&T> {
        if record.id().trim().is_empty() || self.contains(record.id()) {
            record.set_id(T::generate_id(&self.records));
        }
        record.stamp_created(now);
        record.validate(&self.records)?;

        info!(entity = T::ENTITY, id = record.id(), "Inserted record");
        self.records.push(record);
        Ok(&self.records[self.records.len() - 1])
    }

    /// Overwrite only the supplied fields of the record with `id`.
    ///
    /// The id itself cannot be changed, and fields the record guards are
    /// rejected. The update timestamp is always refreshed. Nothing changes if the record is missing or the result
    /// fails validation.
    pub fn update(&mut self, id: &str, patch: Row, now: DateTime<Utc>) -> Result<&T> {
        let index = self.position(id)?;
        self.records[index].guard_patch(&patch)?;

        let mut row = self.records[index].to_row().map_err(form_error)?;
        for (key, value) in patch {
            if key == "id" {
                continue;
            }
            if value.is_null() {
                row.remove(&key);
            } else {
                row.insert(key, value);
            }
        }

        let mut record = T::from_row(row).map_err(form_error)?;
        record.set_id(id.to_string());
        self.replace(index, record, now)
    }

    /// Apply `change` to a copy of the record with `id`, then store it.
    ///
    /// If `change` fails the stored record is left untouched.
    pub fn update_with<R, F>(&mut self, id: &str, now: DateTime<Utc>, change: F) -> Result<(&T, R)>
    where
        F: FnOnce(&mut T) -> Result<R>,
    {
        let index = self.position(id)?;
        let mut record = self.records[index].clone();
        let outcome = change(&mut record)?;
        record.set_id(id.to_string());
        let record = self.replace(index, record, now)?;
        Ok((record, outcome))
    }

    fn replace(&mut self, index: usize, mut record: T, now: DateTime<Utc>) -> Result<&T> {
        record.touch(now);
        record.validate(&self.records)?;

        debug!(entity = T::ENTITY, id = record.id(), "Updated record");
        self.records[index] = record;
        Ok(&self.records[index])
    }

    /// Delete the records named by `ids` after confirmation.
    ///
    /// An empty id list removes nothing and does not prompt. Ids that are not
    /// present are skipped; if none are present the deletion is reported as
    /// not found. Returns the number of records removed.
    pub fn delete<G>(&mut self, ids: &[String], gate: &mut G) -> Result<usize>
    where
        G: ConfirmationGate + ?Sized,
    {
        if ids.is_empty() {
            return Ok(0);
        }

        let known: Vec<&String> = ids.iter().filter(|id| self.contains(id)).collect();
        if known.is_empty() {
            return Err(PortalError::not_found(T::LABEL, ids[0].clone()));
        }

        if !gate.confirm(&delete_prompt(T::LABEL, known.len())) {
            debug!(entity = T::ENTITY, count = known.len(), "Delete declined");
            return Err(PortalError::Declined);
        }

        let before = self.records.len();
        self.records.retain(|r| !known.iter().any(|id| id.as_str() == r.id()));
        let removed = before - self.records.len();

        info!(entity = T::ENTITY, removed, "Deleted records");
        Ok(removed)
    }

    /// Merge imported rows into the collection.
    ///
    /// Rows get an id when theirs is absent or already used, and defaults
    /// for missing optional fields. Either every row is merged or, on the
    /// first bad row, none are. Returns the number of records added.
    pub fn merge_imported(&mut self, rows: Vec<Row>, now: DateTime<Utc>) -> Result<usize> {
        if rows.is_empty() {
            return Err(ImportError::Empty.into());
        }

        let mut merged = self.records.clone();
        let count = rows.len();

        for (i, mut row) in rows.into_iter().enumerate() {
            let line = i + 1;
            normalize_row(&mut row);
            T::apply_defaults(&mut row);

            let needs_id = match row.get("id").and_then(Value::as_str) {
                Some(id) => merged.iter().any(|r| r.id() == id),
                None => true,
            };
            if needs_id {
                row.remove("id");
            }

            let mut record = T::from_row(row).map_err(|e| ImportError::InvalidRow {
                row: line,
                message: e.to_string(),
            })?;
            if needs_id {
                record.set_id(T::generate_id(&merged));
            }
            record.stamp_created(now);
            record
                .validate(&merged)
                .map_err(|errors| ImportError::InvalidRecord { row: line, errors })?;

            merged.push(record);
        }

        self.records = merged;
        info!(entity = T::ENTITY, count, "Imported records");
        Ok(count)
    }
}

impl<T: Record + Activatable> RecordCollection<T> {
    /// Set `isActive` on every selected record, then clear the selection.
    ///
    /// Returns the number of records that were selected and present.
    pub fn set_active(&mut self, selection: &mut Selection, active: bool, now: DateTime<Utc>) -> usize {
        let mut changed = 0;
        for record in self
            .records
            .iter_mut()
            .filter(|r| selection.contains(r.id()))
        {
            record.set_active(active);
            record.touch(now);
            changed += 1;
        }
        selection.clear();

        info!(entity = T::ENTITY, changed, active, "Bulk status change");
        changed
    }

    /// (total, active, inactive)
    pub fn status_counts(&self) -> (usize, usize, usize) {
        let active = self.records.iter().filter(|r| r.is_active()).count();
        (self.records.len(), active, self.records.len() - active)
    }
}

fn form_error(err: serde_json::Error) -> PortalError {
    let mut errors = ValidationErrors::new();
    errors.add(FORM_FIELD, err.to_string());
    PortalError::Validation(errors)
}
