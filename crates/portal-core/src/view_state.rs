//! Serializable per-page view state.

use serde::{Deserialize, Serialize};

use portal_search::FilterCriteria;

use crate::selection::Selection;

/// Everything a page shows besides the records themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewState {
    pub criteria: FilterCriteria,
    pub selection: Selection,
    /// 1-based page number
    pub page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            criteria: FilterCriteria::default(),
            selection: Selection::default(),
            page: 1,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to the first page, after the visible set changed.
    pub fn reset_page(&mut self) {
        self.page = 1;
    }

    /// Clamp the page number into `1..=page_count`.
    pub fn clamp_page(&mut self, page_count: usize) {
        self.page = self.page.clamp(1, page_count.max(1));
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
