//! Parties: customers, vendors, manufacturers and other business contacts.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};

use portal_search::{status_label, FieldValue, Searchable, SmartTarget};

use crate::error::ValidationErrors;
use crate::record::{fill_default, is_blank, Activatable, Record, Row};
use crate::timestamp::{self, is_unset, parse_timestamp};

lazy_static! {
    static ref EMAIL_SHAPE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref ACCOUNT_NUMBER: Regex = Regex::new(
        r"^(ACC-\d{6}|ACCT-\d{4}-\d{4}|A-\d{8}|\d{10}|AC-\d{3}-\d{3}-\d{3}|ACNT-\d{7}|\d{3}-\d{3}-\d{4}|PA-\d{6})$"
    )
    .unwrap();
}

/// Placeholder shown for parties without an account number.
pub const UNASSIGNED_ACCOUNT: &str = "Not assigned";

/// A business party.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub party_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default = "crate::record::default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub region: String,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

impl Party {
    /// A party with the given name and type; everything else blank.
    pub fn new(name: impl Into<String>, party_type: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            party_type: party_type.into(),
            name: name.into(),
            account_number: String::new(),
            contact_person: String::new(),
            email: String::new(),
            phone: String::new(),
            mobile: String::new(),
            address: String::new(),
            city: String::new(),
            country: String::new(),
            is_active: true,
            company: String::new(),
            branch: String::new(),
            region: String::new(),
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
        }
    }

    /// `"city, country"`, skipping blank parts.
    pub fn location(&self) -> String {
        [self.city.as_str(), self.country.as_str()]
            .iter()
            .filter(|s| !s.trim().is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Account number, or the placeholder when none is assigned.
    pub fn account_label(&self) -> &str {
        if self.account_number.trim().is_empty() {
            UNASSIGNED_ACCOUNT
        } else {
            &self.account_number
        }
    }
}

/// Generate an account number in one of the accepted formats.
pub fn generate_account_number<R: Rng>(rng: &mut R) -> String {
    match rng.gen_range(0..8) {
        0 => format!("ACC-{}", rng.gen_range(100_000..1_000_000)),
        1 => format!(
            "ACCT-{}-{}",
            rng.gen_range(1_000..10_000),
            rng.gen_range(1_000..10_000)
        ),
        2 => format!("A-{}", rng.gen_range(10_000_000..100_000_000)),
        3 => rng.gen_range(1_000_000_000u64..10_000_000_000).to_string(),
        4 => format!(
            "AC-{}-{}-{}",
            rng.gen_range(100..1_000),
            rng.gen_range(100..1_000),
            rng.gen_range(100..1_000)
        ),
        5 => format!("ACNT-{}", rng.gen_range(1_000_000..10_000_000)),
        6 => format!(
            "{}-{}-{}",
            rng.gen_range(100..1_000),
            rng.gen_range(100..1_000),
            rng.gen_range(1_000..10_000)
        ),
        _ => format!("PA-{}", rng.gen_range(100_000..1_000_000)),
    }
}

/// Whether `s` is in one of the generated account number formats.
pub fn is_account_number(s: &str) -> bool {
    ACCOUNT_NUMBER.is_match(s)
}

/// Whether `s` looks like an email address.
pub fn is_email_shaped(s: &str) -> bool {
    EMAIL_SHAPE.is_match(s.trim())
}

impl Searchable for Party {
    const FIELDS: &'static [&'static str] = &[
        "id",
        "partyType",
        "name",
        "accountNumber",
        "contactPerson",
        "email",
        "phone",
        "mobile",
        "address",
        "city",
        "country",
        "isActive",
        "company",
        "branch",
        "region",
        "createdAt",
        "updatedAt",
        "status",
        "location",
    ];

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let value = match name {
            "id" => FieldValue::text(&self.id),
            "partyType" => FieldValue::text(&self.party_type),
            "name" => FieldValue::text(&self.name),
            "accountNumber" => FieldValue::text(&self.account_number),
            "contactPerson" => FieldValue::text(&self.contact_person),
            "email" => FieldValue::text(&self.email),
            "phone" => FieldValue::text(&self.phone),
            "mobile" => FieldValue::text(&self.mobile),
            "address" => FieldValue::text(&self.address),
            "city" => FieldValue::text(&self.city),
            "country" => FieldValue::text(&self.country),
            "isActive" => FieldValue::Bool(self.is_active),
            "company" => FieldValue::text(&self.company),
            "branch" => FieldValue::text(&self.branch),
            "region" => FieldValue::text(&self.region),
            "createdAt" => FieldValue::Timestamp(self.created_at),
            "updatedAt" => FieldValue::Timestamp(self.updated_at),
            "status" => FieldValue::text(status_label(self.is_active)),
            "location" => FieldValue::owned(self.location()),
            _ => return None,
        };
        Some(value)
    }

    fn text_fields(&self) -> Vec<&str> {
        vec![
            &self.id,
            &self.party_type,
            &self.name,
            &self.account_number,
            &self.contact_person,
            &self.email,
            &self.phone,
            &self.mobile,
            &self.address,
            &self.city,
            &self.country,
            &self.company,
            &self.branch,
            &self.region,
        ]
        .into_iter()
        .map(String::as_str)
        .collect()
    }

    fn fuzzy_fields(&self) -> Vec<Cow<'_, str>> {
        [
            &self.name,
            &self.email,
            &self.phone,
            &self.city,
            &self.country,
            &self.party_type,
            &self.company,
        ]
        .into_iter()
        .map(|s| Cow::Borrowed(s.as_str()))
        .collect()
    }

    fn smart_field(&self, target: SmartTarget) -> Option<FieldValue<'_>> {
        match target {
            SmartTarget::Category => self.field("partyType"),
            other => self.field(other.default_field()),
        }
    }
}

impl Activatable for Party {
    fn is_active(&self) -> bool {
        self.is_active
    }

    fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }
}

impl Record for Party {
    const ENTITY: &'static str = "parties";
    const LABEL: &'static str = "Party";
    const ID_PREFIX: &'static str = "P";
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
        if is_unset(&self.updated_at) {
            self.updated_at = now;
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn apply_defaults(row: &mut Row) {
        fill_default(row, "isActive", true);
        fill_default(row, "company", "Unknown Company");
        fill_default(row, "branch", "Main");
        fill_default(row, "region", "Default");

        let unassigned = row
            .get("accountNumber")
            .and_then(|v| v.as_str())
            .map_or(false, |s| s.trim() == UNASSIGNED_ACCOUNT);
        if unassigned || is_blank(row, "accountNumber") {
            let account = generate_account_number(&mut rand::thread_rng());
            row.insert("accountNumber".to_string(), account.into());
        }
    }

    fn validate(&self, _others: &[Self]) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.name.trim().is_empty() {
            errors.add("name", "Name is required");
        }
        if self.party_type.trim().is_empty() {
            errors.add("partyType", "Party type is required");
        }
        if !self.email.trim().is_empty() && !is_email_shaped(&self.email) {
            errors.add("email", "Enter a valid email address");
        }

        errors.into_result()
    }

    fn default_dataset(_now: DateTime<Utc>) -> Vec<Self> {
        let rows = [
            ("P001", "Customer", "Acme Corporation", "ACC-789456", "John Smith", "john@acme.com", "555-1234", "555-1235", "123 Main St, Suite 100, New York, NY 10001", "New York", true, "TechCorp", "East Branch", "Northeast", "2023-01-10T10:30:00", "2023-06-15T14:45:00"),
            ("P002", "Vendor", "Global Supplies Inc", "ACCT-4521-7890", "Jane Doe", "jane@globalsupplies.com", "555-5678", "555-5679", "456 Oak Ave, Floor 3, Chicago, IL 60601", "Chicago", true, "TechCorp", "Midwest Branch", "Central", "2023-02-05T09:15:00", "2023-06-20T11:30:00"),
            ("P003", "Manufacturer", "Tech Manufacturing Ltd", "A-85647321", "Robert Johnson", "robert@techmanufacturing.com", "555-9012", "555-9013", "789 Pine Rd, Building B, Los Angeles, CA 90210", "Los Angeles", true, "GlobalTech", "West Branch", "West", "2023-01-20T13:45:00", "2023-07-01T16:20:00"),
            ("P004", "Transporter", "Fast Logistics", "3698521470", "Sarah Williams", "sarah@fastlogistics.com", "555-3456", "555-3457", "321 Elm Blvd, Warehouse 5, Miami, FL 33101", "Miami", false, "TechCorp", "East Branch", "Southeast", "2023-03-15T10:00:00", "2023-06-28T09:10:00"),
            ("P005", "Insurance", "Secure Insurance Co", "AC-147-258-369", "Michael Brown", "michael@secureinsurance.com", "555-7890", "555-7891", "654 Birch Ln, Tower A, Boston, MA 02101", "Boston", true, "TechCorp", "East Branch", "Northeast", "2023-02-10T14:30:00", "2023-07-05T11:45:00"),
            ("P006", "Customer", "Beta Industries", "ACNT-9876543", "Emily Davis", "emily@betaindustries.com", "555-2345", "555-2346", "987 Cedar St, Office 200, Dallas, TX 75201", "Dallas", true, "GlobalTech", "South Branch", "South", "2023-01-25T11:20:00", "2023-06-10T15:30:00"),
            ("P007", "Prospect", "Future Client LLC", "741-852-9630", "David Wilson", "david@futureclient.com", "555-6789", "555-6790", "753 Maple Ave, Unit 15, Seattle, WA 98101", "Seattle", true, "GlobalTech", "West Branch", "Northwest", "2023-04-05T09:45:00", "2023-07-02T10:15:00"),
            ("P008", "Contractor", "Build Right Construction", "PA-654321", "Thomas Anderson", "thomas@buildright.com", "555-0123", "555-0124", "159 Walnut Rd, Shop 7, Denver, CO 80202", "Denver", false, "TechCorp", "Midwest Branch", "Central", "2023-03-20T13:10:00", "2023-06-25T14:40:00"),
        ];

        rows.into_iter()
            .map(
                |(id, party_type, name, account, contact, email, phone, mobile, address, city, active, company, branch, region, created, updated)| Party {
                    id: id.to_string(),
                    party_type: party_type.to_string(),
                    name: name.to_string(),
                    account_number: account.to_string(),
                    contact_person: contact.to_string(),
                    email: email.to_string(),
                    phone: phone.to_string(),
                    mobile: mobile.to_string(),
                    address: address.to_string(),
                    city: city.to_string(),
                    country: "USA".to_string(),
                    is_active: active,
                    company: company.to_string(),
                    branch: branch.to_string(),
                    region: region.to_string(),
                    created_at: parse_timestamp(created).unwrap_or_default(),
                    updated_at: parse_timestamp(updated).unwrap_or_default(),
                },
            )
            .collect()
    }
}
