//! Customer support tickets with comments and an append-only status history.

mod status;

pub use status::*;

use std::borrow::Cow;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use portal_search::{FieldValue, Searchable};

use crate::error::{DomainError, Result, ValidationErrors};
use crate::record::{fill_default, Record, Row};
use crate::timestamp::{self, is_unset};

/// A comment on a ticket. Status changes leave system comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub text: String,
    #[serde(
        serialize_with = "chrono::serde::ts_milliseconds::serialize",
        deserialize_with = "timestamp::deserialize"
    )]
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub is_system_comment: bool,
}

impl Comment {
    pub fn new(author: impl Into<String>, text: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            time,
            is_system_comment: false,
        }
    }

    pub fn system(author: impl Into<String>, text: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            is_system_comment: true,
            ..Self::new(author, text, time)
        }
    }
}

/// One immutable entry of a ticket's status history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub from: TicketStatus,
    pub to: TicketStatus,
    #[serde(default)]
    pub changed_by: String,
    #[serde(
        serialize_with = "chrono::serde::ts_milliseconds::serialize",
        deserialize_with = "timestamp::deserialize"
    )]
    pub time: DateTime<Utc>,
}

/// A support ticket.
///
/// Timestamps are stored as epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TicketStatus,
    #[serde(default)]
    pub priority: TicketPriority,
    #[serde(
        default,
        serialize_with = "chrono::serde::ts_milliseconds::serialize",
        deserialize_with = "timestamp::deserialize"
    )]
    pub created: DateTime<Utc>,
    #[serde(
        default,
        serialize_with = "chrono::serde::ts_milliseconds::serialize",
        deserialize_with = "timestamp::deserialize"
    )]
    pub updated: DateTime<Utc>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub status_history: Vec<StatusChange>,
}

impl Ticket {
    pub fn new(title: impl Into<String>, description: impl Into<String>, priority: TicketPriority) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            description: description.into(),
            status: TicketStatus::Open,
            priority,
            created: DateTime::<Utc>::default(),
            updated: DateTime::<Utc>::default(),
            comments: Vec::new(),
            status_history: Vec::new(),
        }
    }

    /// Move to `to`, recording who changed it.
    ///
    /// Appends exactly one history entry and one system comment. The entry
    /// time never precedes the previous entry, even if `now` does.
    pub fn transition_to(
        &mut self,
        to: TicketStatus,
        changed_by: &str,
        now: DateTime<Utc>,
    ) -> Result<&StatusChange> {
        if !self.status.can_transition_to(&to) {
            return Err(DomainError::UnchangedStatus {
                id: self.id.clone(),
                status: self.status.to_string(),
            });
        }

        let from = self.status;
        let time = match self.status_history.last() {
            Some(previous) if previous.time > now => previous.time,
            _ => now,
        };

        self.status = to;
        self.updated = time;
        self.comments.push(Comment::system(
            changed_by,
            format!("Status changed from \"{}\" to \"{}\"", from, to),
            time,
        ));
        self.status_history.push(StatusChange {
            from,
            to,
            changed_by: changed_by.to_string(),
            time,
        });

        tracing::debug!(ticket = %self.id, %from, %to, "Ticket status changed");

        Ok(&self.status_history[self.status_history.len() - 1])
    }

    /// Step along the forward path (`open → in-progress → resolved → closed`).
    pub fn advance(&mut self, changed_by: &str, now: DateTime<Utc>) -> Result<&StatusChange> {
        let next = self.status.next().ok_or_else(|| DomainError::UnchangedStatus {
            id: self.id.clone(),
            status: self.status.to_string(),
        })?;
        self.transition_to(next, changed_by, now)
    }

    /// Reopen a closed ticket.
    pub fn reopen(&mut self, changed_by: &str, now: DateTime<Utc>) -> Result<&StatusChange> {
        let target = self.status.reopen().ok_or_else(|| DomainError::UnchangedStatus {
            id: self.id.clone(),
            status: self.status.to_string(),
        })?;
        self.transition_to(target, changed_by, now)
    }

    /// Append a user comment.
    pub fn add_comment(&mut self, author: &str, text: &str, now: DateTime<Utc>) -> Result<&Comment> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::EmptyComment);
        }

        self.comments.push(Comment::new(author, text, now));
        self.updated = now;
        Ok(&self.comments[self.comments.len() - 1])
    }

    /// Comments written by people, not status changes.
    pub fn user_comments(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter().filter(|c| !c.is_system_comment)
    }
}

impl Searchable for Ticket {
    const FIELDS: &'static [&'static str] = &[
        "id",
        "title",
        "description",
        "status",
        "priority",
        "created",
        "updated",
        "createdAt",
    ];

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let value = match name {
            "id" => FieldValue::text(&self.id),
            "title" => FieldValue::text(&self.title),
            "description" => FieldValue::text(&self.description),
            "status" => FieldValue::text(self.status.as_str()),
            "priority" => FieldValue::text(self.priority.as_str()),
            "created" | "createdAt" => FieldValue::Timestamp(self.created),
            "updated" => FieldValue::Timestamp(self.updated),
            _ => return None,
        };
        Some(value)
    }

    fn text_fields(&self) -> Vec<&str> {
        vec![
            self.id.as_str(),
            self.title.as_str(),
            self.description.as_str(),
            self.status.as_str(),
            self.priority.as_str(),
        ]
    }

    fn fuzzy_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.title.as_str()),
            Cow::Borrowed(self.description.as_str()),
        ]
    }
}

impl Record for Ticket {
    const ENTITY: &'static str = "tickets";
    const LABEL: &'static str = "Ticket";
    const ID_PREFIX: &'static str = "ticket";
    const ID_WIDTH: usize = 1;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn stamp_created(&mut self, now: DateTime<Utc>) {
        if is_unset(&self.created) {
            self.created = now;
        }
        if is_unset(&self.updated) {
            self.updated = now;
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated = now;
    }

    fn apply_defaults(row: &mut Row) {
        fill_default(row, "status", TicketStatus::Open.as_str());
        fill_default(row, "priority", TicketPriority::Medium.as_str());

        for key in ["status", "priority"] {
            if let Some(serde_json::Value::String(s)) = row.get_mut(key) {
                *s = s.trim().to_lowercase().replace(' ', "-");
            }
        }
    }

    fn validate(&self, _others: &[Self]) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.title.trim().is_empty() {
            errors.add("title", "Title is required");
        }
        if self.description.trim().is_empty() {
            errors.add("description", "Description is required");
        }

        errors.into_result()
    }

    /// History is append-only: status, history and comments change only
    /// through `transition_to` and `add_comment`.
    fn guard_patch(&self, patch: &Row) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if patch.contains_key("status") {
            errors.add("status", "Status changes must go through a status transition");
        }
        for field in ["statusHistory", "comments"] {
            if patch.contains_key(field) {
                errors.add(field, "Field cannot be edited directly");
            }
        }

        errors.into_result()
    }

    fn default_dataset(now: DateTime<Utc>) -> Vec<Self> {
        let ago = |hours: i64| now - Duration::hours(hours);
        let agent = "Support Agent";

        vec![
            Ticket {
                id: "ticket1".to_string(),
                title: "Unable to access account settings".to_string(),
                description: "I'm trying to change my password but the settings page is not loading correctly.".to_string(),
                status: TicketStatus::Open,
                priority: TicketPriority::High,
                created: ago(2),
                updated: ago(1),
                comments: vec![Comment::new(
                    agent,
                    "Thank you for reporting this issue. Could you please provide more details about the error you're seeing?",
                    ago(1),
                )],
                status_history: Vec::new(),
            },
            Ticket {
                id: "ticket2".to_string(),
                title: "Feature request: Dark mode".to_string(),
                description: "Would it be possible to add a dark mode option to the portal?".to_string(),
                status: TicketStatus::InProgress,
                priority: TicketPriority::Medium,
                created: ago(24),
                updated: ago(12),
                comments: vec![Comment::new(
                    agent,
                    "Thank you for your suggestion! We're currently working on implementing a dark mode option.",
                    ago(12),
                )],
                status_history: Vec::new(),
            },
            Ticket {
                id: "ticket3".to_string(),
                title: "Question about billing cycle".to_string(),
                description: "I have a question about when my subscription renews and how billing works.".to_string(),
                status: TicketStatus::Resolved,
                priority: TicketPriority::Low,
                created: ago(72),
                updated: ago(48),
                comments: vec![
                    Comment::new(
                        agent,
                        "Your subscription renews on the 15th of each month. You can view your billing history in the Account section.",
                        ago(48),
                    ),
                    Comment::new("John Doe", "Thank you for the information!", ago(24)),
                ],
                status_history: Vec::new(),
            },
            Ticket {
                id: "ticket4".to_string(),
                title: "API integration issue".to_string(),
                description: "I'm having trouble integrating with your API. Getting error code 403.".to_string(),
                status: TicketStatus::Closed,
                priority: TicketPriority::High,
                created: ago(168),
                updated: ago(144),
                comments: vec![
                    Comment::new(
                        agent,
                        "You need to generate a new API key in your account settings. The old one might have expired.",
                        ago(144),
                    ),
                    Comment::new("John Doe", "That worked! Thank you for your help.", ago(120)),
                ],
                status_history: Vec::new(),
            },
        ]
    }
}
