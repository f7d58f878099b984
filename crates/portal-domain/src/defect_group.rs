//! Defect groups: coded buckets that manufacturing defects are filed under.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use portal_search::{status_label, FieldValue, Searchable};

use crate::error::ValidationErrors;
use crate::record::{fill_default, row_text, Activatable, Record, Row};
use crate::timestamp::{self, is_unset, parse_timestamp};

/// Minimum length of a defect group code.
pub const MIN_CODE_LEN: usize = 3;

/// Priority levels offered by the defect group form.
pub const PRIORITIES: &[&str] = &["Low", "Medium", "High", "Critical"];

/// A defect group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefectGroup {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub defect_group: String,
    #[serde(default)]
    pub category: String,
    #[serde(default = "crate::record::default_active")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub assigned_to: String,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub last_updated: DateTime<Utc>,
}

impl DefectGroup {
    pub fn new(
        code: impl Into<String>,
        defect_group: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            code: code.into(),
            defect_group: defect_group.into(),
            category: category.into(),
            is_active: true,
            created_at: DateTime::<Utc>::default(),
            description: String::new(),
            priority: String::new(),
            assigned_to: String::new(),
            last_updated: DateTime::<Utc>::default(),
        }
    }
}

impl Searchable for DefectGroup {
    const FIELDS: &'static [&'static str] = &[
        "id",
        "code",
        "defectGroup",
        "category",
        "isActive",
        "createdAt",
        "description",
        "priority",
        "assignedTo",
        "lastUpdated",
        "status",
    ];

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let value = match name {
            "id" => FieldValue::text(&self.id),
            "code" => FieldValue::text(&self.code),
            "defectGroup" => FieldValue::text(&self.defect_group),
            "category" => FieldValue::text(&self.category),
            "isActive" => FieldValue::Bool(self.is_active),
            "createdAt" => FieldValue::Timestamp(self.created_at),
            "description" => FieldValue::text(&self.description),
            "priority" => FieldValue::text(&self.priority),
            "assignedTo" => FieldValue::text(&self.assigned_to),
            "lastUpdated" => FieldValue::Timestamp(self.last_updated),
            "status" => FieldValue::text(status_label(self.is_active)),
            _ => return None,
        };
        Some(value)
    }

    fn text_fields(&self) -> Vec<&str> {
        vec![
            self.id.as_str(),
            self.code.as_str(),
            self.defect_group.as_str(),
            self.category.as_str(),
            self.description.as_str(),
            self.priority.as_str(),
            self.assigned_to.as_str(),
        ]
    }

    fn fuzzy_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.code.as_str()),
            Cow::Borrowed(self.defect_group.as_str()),
            Cow::Borrowed(self.category.as_str()),
            Cow::Borrowed(self.description.as_str()),
            Cow::Borrowed(self.assigned_to.as_str()),
        ]
    }
}

impl Activatable for DefectGroup {
    fn is_active(&self) -> bool {
        self.is_active
    }

    fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }
}

impl Record for DefectGroup {
    const ENTITY: &'static str = "defectGroups";
    const LABEL: &'static str = "Defect group";
    const ID_PREFIX: &'static str = "DG";
    const ID_WIDTH: usize = 3;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
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
        if let Some(code) = row_text(row, "code").map(str::to_string) {
            row.insert("code".to_string(), Value::String(code));
        }

        let description = row_text(row, "defectGroup")
            .map(|name| format!("{} defect group", name))
            .unwrap_or_default();
        fill_default(row, "description", description);
        fill_default(row, "priority", "Medium");
        fill_default(row, "assignedTo", "System Admin");
        fill_default(row, "isActive", true);
    }

    fn validate(&self, others: &[Self]) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let code = self.code.trim();

        if code.chars().count() < MIN_CODE_LEN {
            errors.add("code", "Code must be at least 3 characters long");
        }

        let duplicate = others
            .iter()
            .filter(|other| other.id != self.id)
            .any(|other| other.code.trim().to_lowercase() == code.to_lowercase());
        if duplicate {
            errors.add("code", "Code already exists");
        }

        if self.category.trim().is_empty() {
            errors.add("category", "Category is required");
        }
        if self.defect_group.trim().is_empty() {
            errors.add("defectGroup", "Defect group name is required");
        }

        errors.into_result()
    }

    fn default_dataset(_now: DateTime<Utc>) -> Vec<Self> {
        let rows = [
            ("ELC001", "Electrical", "Electrical", true, "2024-01-15T10:30:00Z", "Electrical system defects and malfunctions", "High", "John Smith", "2024-01-20T14:22:00Z"),
            ("ENG001", "Engine", "Mechanical", true, "2024-01-10T09:15:00Z", "Engine performance and mechanical issues", "Critical", "Sarah Johnson", "2024-01-22T11:45:00Z"),
            ("HYD001", "Hydraulic", "Hydraulic", false, "2024-01-08T16:20:00Z", "Hydraulic system pressure and fluid issues", "Medium", "Mike Davis", "2024-01-18T13:30:00Z"),
            ("BRK001", "Braking System", "Safety", true, "2024-01-12T11:45:00Z", "Brake system defects and safety concerns", "Critical", "Lisa Wilson", "2024-01-21T16:10:00Z"),
            ("TRN001", "Transmission", "Mechanical", true, "2024-01-14T14:30:00Z", "Transmission and gear system issues", "High", "Robert Brown", "2024-01-19T10:15:00Z"),
            ("STR001", "Steering", "Control", true, "2024-01-16T08:00:00Z", "Steering mechanism and control defects", "High", "Emma Taylor", "2024-01-23T09:20:00Z"),
            ("SUS001", "Suspension", "Mechanical", false, "2024-01-05T12:15:00Z", "Suspension system and shock absorber issues", "Medium", "David Wilson", "2024-01-17T15:45:00Z"),
            ("FUL001", "Fuel System", "Engine", true, "2024-01-18T13:20:00Z", "Fuel delivery and injection system defects", "High", "Jennifer Lee", "2024-01-24T12:30:00Z"),
        ];

        rows.into_iter()
            .enumerate()
            .map(
                |(i, (code, name, category, active, created, description, priority, assignee, updated))| {
                    DefectGroup {
                        id: format!("{}{:03}", Self::ID_PREFIX, i + 1),
                        code: code.to_string(),
                        defect_group: name.to_string(),
                        category: category.to_string(),
                        is_active: active,
                        created_at: parse_timestamp(created).unwrap_or_default(),
                        description: description.to_string(),
                        priority: priority.to_string(),
                        assigned_to: assignee.to_string(),
                        last_updated: parse_timestamp(updated).unwrap_or_default(),
                    }
                },
            )
            .collect()
    }
}
