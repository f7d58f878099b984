//! Shared fixture record for engine tests.

use std::borrow::Cow;

use chrono::{DateTime, TimeZone, Utc};
use portal_search::{FieldValue, Searchable};

#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub category: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Contact {
    pub fn new(name: &str, email: &str, city: &str, category: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            phone: String::new(),
            city: city.to_string(),
            category: category.to_string(),
            is_active: true,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    pub fn phone(mut self, phone: &str) -> Self {
        self.phone = phone.to_string();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn created(mut self, day: u32) -> Self {
        self.created_at = Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap();
        self
    }
}

impl Searchable for Contact {
    const FIELDS: &'static [&'static str] = &[
        "name",
        "email",
        "phone",
        "city",
        "category",
        "isActive",
        "createdAt",
    ];

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "name" => Some(FieldValue::text(&self.name)),
            "email" => Some(FieldValue::text(&self.email)),
            "phone" => Some(FieldValue::text(&self.phone)),
            "city" => Some(FieldValue::text(&self.city)),
            "category" => Some(FieldValue::text(&self.category)),
            "isActive" => Some(FieldValue::Bool(self.is_active)),
            "createdAt" => Some(FieldValue::Timestamp(self.created_at)),
            _ => None,
        }
    }

    fn text_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.email.as_str(),
            self.phone.as_str(),
            self.city.as_str(),
            self.category.as_str(),
        ]
    }

    fn fuzzy_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.name.as_str()),
            Cow::Borrowed(self.city.as_str()),
            Cow::Borrowed(self.category.as_str()),
        ]
    }
}

/// A small directory used across tests.
pub fn directory() -> Vec<Contact> {
    vec![
        Contact::new("Jane Doe", "jane@example.com", "Seattle", "Customer")
            .phone("+1 (206) 555-0101")
            .created(3),
        Contact::new("Example Supplies", "sales@supplies.io", "Portland", "Vendor")
            .phone("503-555-0199")
            .created(10),
        // Mentions jane@example.com outside the email field
        Contact::new("jane@example.com Holdings", "info@holdings.com", "Seattle Heights", "Prospect")
            .created(20)
            .inactive(),
        Contact::new("Acme Manufacturing", "ops@acme.com", "seattle", "Manufacturer")
            .phone("206 555 0142")
            .created(25),
    ]
}
