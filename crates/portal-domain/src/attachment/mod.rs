//! File attachments with labels, reference documents and optional e-signatures.

mod file;
mod signature;

pub use file::*;
pub use signature::*;

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use portal_search::{FieldValue, Searchable};

use crate::error::ValidationErrors;
use crate::record::{fill_default, Record, Row};
use crate::timestamp::{self, is_unset};

/// Uploader recorded when none is given.
pub const DEFAULT_CREATOR: &str = "Admin";

/// An uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "deserialize_labels")]
    pub labels: Vec<String>,
    /// Key into [`REFERENCE_DOCUMENTS`]
    #[serde(default)]
    pub attached_to: String,
    #[serde(default, deserialize_with = "deserialize_size")]
    pub size_bytes: u64,
    #[serde(default)]
    pub creator: String,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub requires_signature: bool,
    #[serde(default)]
    pub signature: Option<Signature>,
}

fn deserialize_labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawLabels {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match RawLabels::deserialize(deserializer)? {
        RawLabels::List(list) => list
            .iter()
            .flat_map(|label| parse_labels(label))
            .collect(),
        RawLabels::Joined(joined) => parse_labels(&joined),
    })
}

fn deserialize_size<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawSize {
        Bytes(u64),
        Text(String),
    }

    match RawSize::deserialize(deserializer)? {
        RawSize::Bytes(bytes) => Ok(bytes),
        RawSize::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid file size: {}", text))),
    }
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            id: String::new(),
            file_name: file_name.into(),
            description: String::new(),
            labels: Vec::new(),
            attached_to: String::new(),
            size_bytes,
            creator: DEFAULT_CREATOR.to_string(),
            created_at: DateTime::<Utc>::default(),
            last_updated: DateTime::<Utc>::default(),
            requires_signature: false,
            signature: None,
        }
    }

    pub fn kind(&self) -> FileKind {
        FileKind::from_file_name(&self.file_name)
    }

    pub fn size_label(&self) -> String {
        format_file_size(self.size_bytes)
    }

    /// Reference document title, falling back to the raw key.
    pub fn attached_to_title(&self) -> &str {
        reference_title(&self.attached_to).unwrap_or(self.attached_to.as_str())
    }

    pub fn is_signed(&self) -> bool {
        self.signature.as_ref().map_or(false, |s| !s.is_empty())
    }

    /// Attach a signature and refresh the update time.
    pub fn sign(&mut self, signature: Signature) {
        self.last_updated = signature.signed_at;
        self.signature = Some(signature);
    }

    pub fn has_label(&self, label: &str) -> bool {
        let label = label.trim().to_lowercase();
        self.labels.iter().any(|l| l.to_lowercase() == label)
    }
}

impl Searchable for Attachment {
    const FIELDS: &'static [&'static str] = &[
        "id",
        "fileName",
        "description",
        "labels",
        "attachedTo",
        "attachedToTitle",
        "sizeBytes",
        "size",
        "fileType",
        "creator",
        "createdAt",
        "lastUpdated",
        "signed",
    ];

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let value = match name {
            "id" => FieldValue::text(&self.id),
            "fileName" => FieldValue::text(&self.file_name),
            "description" => FieldValue::text(&self.description),
            "labels" => FieldValue::owned(self.labels.join(", ")),
            "attachedTo" => FieldValue::text(&self.attached_to),
            "attachedToTitle" => FieldValue::text(self.attached_to_title()),
            "sizeBytes" => FieldValue::Number(self.size_bytes as f64),
            "size" => FieldValue::owned(self.size_label()),
            "fileType" => FieldValue::text(self.kind().as_str()),
            "creator" => FieldValue::text(&self.creator),
            "createdAt" => FieldValue::Timestamp(self.created_at),
            "lastUpdated" => FieldValue::Timestamp(self.last_updated),
            "signed" => FieldValue::text(if self.is_signed() { "Signed" } else { "Unsigned" }),
            _ => return None,
        };
        Some(value)
    }

    fn text_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.id.as_str(),
            self.file_name.as_str(),
            self.description.as_str(),
            self.attached_to.as_str(),
            self.creator.as_str(),
        ];
        fields.extend(self.labels.iter().map(String::as_str));
        fields
    }

    fn fuzzy_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.file_name.as_str()),
            Cow::Borrowed(self.description.as_str()),
            Cow::Owned(self.labels.join(" ")),
        ]
    }
}

impl Record for Attachment {
    const ENTITY: &'static str = "attachments";
    const LABEL: &'static str = "Attachment";
    const ID_PREFIX: &'static str = "file_";
    const ID_WIDTH: usize = 0;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    /// Random suffix rather than a sequence number.
    fn generate_id(existing: &[Self]) -> String {
        loop {
            let id = format!("{}{}", Self::ID_PREFIX, Uuid::new_v4().simple());
            if existing.iter().all(|a| a.id != id) {
                return id;
            }
        }
    }

    fn stamp_created(&mut self, now: DateTime<Utc>) {
        if is_unset(&self.created_at) {
            self.created_at = now;
        }
        if is_unset(&self.last_updated) {
            self.last_updated = now;
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.last_updated = now;
    }

    fn apply_defaults(row: &mut Row) {
        fill_default(row, "creator", DEFAULT_CREATOR);
    }

    fn validate(&self, _others: &[Self]) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.file_name.trim().is_empty() {
            errors.add("fileName", "Please select a file to upload");
        }
        if self.requires_signature && !self.is_signed() {
            errors.add("signature", "Please add a signature before uploading");
        }

        errors.into_result()
    }

    fn default_dataset(_now: DateTime<Utc>) -> Vec<Self> {
        Vec::new()
    }
}
