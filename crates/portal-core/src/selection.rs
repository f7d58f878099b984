//! Row selection for bulk actions.

use serde::{Deserialize, Serialize};

/// Ordered set of selected record ids.
///
/// Ids keep the order in which they were selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    ids: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|s| s == id)
    }

    /// Add `id`. Returns false if it was already selected.
    pub fn select(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Remove `id`. Returns whether it was selected.
    pub fn deselect(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|s| s != id);
        self.ids.len() != before
    }

    /// Flip `id`. Returns whether it is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.deselect(id) {
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    /// Select every id in `ids`, keeping existing selections.
    pub fn select_all<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for id in ids {
            self.select(id);
        }
    }

    /// Whether every id in `ids` is selected (false for an empty page).
    pub fn covers<'a, I>(&self, ids: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut any = false;
        for id in ids {
            if !self.contains(id) {
                return false;
            }
            any = true;
        }
        any
    }

    /// Drop ids that no longer name a record.
    pub fn retain_known<'a, I>(&mut self, known: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let known: Vec<&str> = known.into_iter().collect();
        self.ids.retain(|id| known.contains(&id.as_str()));
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = Selection::new();
        selection.select_all(iter);
        selection
    }
}
