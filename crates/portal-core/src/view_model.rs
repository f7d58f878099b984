//! Pure record → view-model mapping.
//!
//! Nothing here knows how rows are drawn; a front end renders [`PageView`]
//! however it likes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use portal_domain::{Attachment, DefectGroup, Party, Record, Ticket, TicketPriority, TicketStatus};
use portal_search::status_label;

use crate::config::PagingConfig;

/// Colour family of a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Success,
    Info,
    Warning,
    Danger,
    Neutral,
}

/// A small labelled pill next to a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub label: String,
    pub tone: Tone,
}

impl Badge {
    pub fn new(label: impl Into<String>, tone: Tone) -> Self {
        Self {
            label: label.into(),
            tone,
        }
    }

    /// Active/Inactive status badge.
    pub fn status(active: bool) -> Self {
        let tone = if active { Tone::Success } else { Tone::Neutral };
        Self::new(status_label(active), tone)
    }
}

/// One rendered table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowView {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    /// (column heading, cell text)
    pub columns: Vec<(String, String)>,
    pub badges: Vec<Badge>,
}

impl RowView {
    fn new(id: &str, title: &str, subtitle: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            subtitle: subtitle.into(),
            columns: Vec::new(),
            badges: Vec::new(),
        }
    }

    fn column(mut self, heading: &str, text: impl Into<String>) -> Self {
        self.columns.push((heading.to_string(), text.into()));
        self
    }

    fn badge(mut self, badge: Badge) -> Self {
        self.badges.push(badge);
        self
    }

    /// Cell text under `heading`.
    pub fn cell(&self, heading: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(h, _)| h == heading)
            .map(|(_, text)| text.as_str())
    }
}

/// Records that can be shown as a table row.
pub trait Presentable: Record {
    fn row_view(&self, now: DateTime<Utc>) -> RowView;

    /// Whether the record counts as active in page stats; `None` for record
    /// types without a status.
    fn status_flag(&self) -> Option<bool> {
        None
    }
}

impl Presentable for Party {
    fn row_view(&self, _now: DateTime<Utc>) -> RowView {
        RowView::new(&self.id, &self.name, self.party_type.as_str())
            .column("Account", self.account_label())
            .column("Contact", self.contact_person.as_str())
            .column("Email", self.email.as_str())
            .column("Phone", self.phone.as_str())
            .column("Location", self.location())
            .column("Company", self.company.as_str())
            .badge(Badge::new(self.party_type.as_str(), Tone::Info))
            .badge(Badge::status(self.is_active))
    }

    fn status_flag(&self) -> Option<bool> {
        Some(self.is_active)
    }
}

/// Badge tone for a defect group priority name.
pub fn priority_tone(priority: &str) -> Tone {
    match priority {
        "Critical" => Tone::Danger,
        "High" => Tone::Warning,
        "Medium" => Tone::Info,
        "Low" => Tone::Success,
        _ => Tone::Neutral,
    }
}

impl Presentable for DefectGroup {
    fn row_view(&self, now: DateTime<Utc>) -> RowView {
        RowView::new(&self.id, &self.defect_group, self.code.as_str())
            .column("Category", self.category.as_str())
            .column("Assigned To", self.assigned_to.as_str())
            .column("Created", format_date(self.created_at))
            .column("Last Updated", format_time_ago(self.last_updated, now))
            .badge(Badge::new(self.priority.as_str(), priority_tone(&self.priority)))
            .badge(Badge::status(self.is_active))
    }

    fn status_flag(&self) -> Option<bool> {
        Some(self.is_active)
    }
}

fn ticket_status_tone(status: TicketStatus) -> Tone {
    match status {
        TicketStatus::Open => Tone::Info,
        TicketStatus::InProgress => Tone::Warning,
        TicketStatus::Resolved => Tone::Success,
        TicketStatus::Closed => Tone::Neutral,
    }
}

fn ticket_priority_tone(priority: TicketPriority) -> Tone {
    match priority {
        TicketPriority::High => Tone::Danger,
        TicketPriority::Medium => Tone::Warning,
        TicketPriority::Low => Tone::Success,
    }
}

impl Presentable for Ticket {
    fn row_view(&self, now: DateTime<Utc>) -> RowView {
        RowView::new(&self.id, &self.title, self.id.as_str())
            .column("Created", format_time_ago(self.created, now))
            .column("Updated", format_time_ago(self.updated, now))
            .column("Comments", self.user_comments().count().to_string())
            .badge(Badge::new(self.status.label(), ticket_status_tone(self.status)))
            .badge(Badge::new(
                self.priority.label(),
                ticket_priority_tone(self.priority),
            ))
    }

    /// Open and in-progress tickets count as active.
    fn status_flag(&self) -> Option<bool> {
        Some(self.status.is_open())
    }
}

impl Presentable for Attachment {
    fn row_view(&self, _now: DateTime<Utc>) -> RowView {
        let mut row = RowView::new(&self.id, &self.file_name, self.attached_to_title())
            .column("Type", self.kind().as_str())
            .column("Size", self.size_label())
            .column("Labels", self.labels.join(", "))
            .column("Uploaded By", self.creator.as_str())
            .column("Uploaded", format_date(self.created_at));

        if self.is_signed() {
            row = row.badge(Badge::new("Signed", Tone::Success));
        } else if self.requires_signature {
            row = row.badge(Badge::new("Signature required", Tone::Warning));
        }
        row
    }
}

/// Counts shown in the page header cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

impl PageStats {
    pub fn from_records<T: Presentable>(records: &[T]) -> Self {
        records
            .iter()
            .fold(Self { total: records.len(), ..Self::default() }, |mut stats, r| {
                match r.status_flag() {
                    Some(true) => stats.active += 1,
                    Some(false) => stats.inactive += 1,
                    None => {}
                }
                stats
            })
    }
}

/// One page of the visible records plus paging chrome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageView {
    pub rows: Vec<RowView>,
    /// 1-based current page
    pub page: usize,
    pub page_count: usize,
    /// Page number buttons, at most `max_visible_pages` around the current page
    pub page_numbers: Vec<usize>,
    /// Number of visible (filtered) records
    pub total: usize,
    pub summary: String,
    pub has_previous: bool,
    pub has_next: bool,
    /// Stats over the whole collection, not just the visible set
    pub stats: PageStats,
}

impl PageView {
    /// Build the view of `page` (clamped) over `visible`.
    pub fn build<T: Presentable>(
        visible: &[&T],
        all: &[T],
        page: usize,
        paging: &PagingConfig,
        now: DateTime<Utc>,
    ) -> Self {
        let size = paging.page_size.max(1);
        let total = visible.len();
        let page_count = page_count(total, size);
        let page = page.clamp(1, page_count);

        let start = (page - 1) * size;
        let end = (start + size).min(total);

        let rows = visible[start.min(total)..end]
            .iter()
            .map(|r| r.row_view(now))
            .collect();

        Self {
            rows,
            page,
            page_count,
            page_numbers: page_window(page, page_count, paging.max_visible_pages),
            total,
            summary: summary_text(start, end, total),
            has_previous: page > 1,
            has_next: page < page_count,
            stats: PageStats::from_records(all),
        }
    }
}

/// Number of pages needed for `total` rows; at least one.
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

/// Up to `max_visible` consecutive page numbers centred on `page`.
pub fn page_window(page: usize, page_count: usize, max_visible: usize) -> Vec<usize> {
    let max_visible = max_visible.max(1);
    let mut start = page.saturating_sub(max_visible / 2).max(1);
    let end = (start + max_visible - 1).min(page_count);
    if end + 1 - start < max_visible {
        start = (end + 1).saturating_sub(max_visible).max(1);
    }
    (start..=end).collect()
}

/// `"Showing X to Y of Z results"` for the 0-based half-open range `start..end`.
pub fn summary_text(start: usize, end: usize, total: usize) -> String {
    let first = if total == 0 { 0 } else { start + 1 };
    format!("Showing {} to {} of {} results", first, end, total)
}

/// `"Jan 15, 2024"`
pub fn format_date(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y").to_string()
}

/// Relative time for recent instants, falling back to [`format_date`] after a week.
pub fn format_time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - at).num_seconds();

    fn plural(n: i64, unit: &str) -> String {
        format!("{} {}{} ago", n, unit, if n == 1 { "" } else { "s" })
    }

    match seconds {
        s if s < 60 => "Just now".to_string(),
        s if s < 3_600 => plural(s / 60, "minute"),
        s if s < 86_400 => plural(s / 3_600, "hour"),
        s if s < 604_800 => plural(s / 86_400, "day"),
        _ => format_date(at),
    }
}
