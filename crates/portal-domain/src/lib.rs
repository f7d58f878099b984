//! portal-domain: Record types for the portal pages.
//!
//! Each page works over one record type: [`Party`], [`DefectGroup`],
//! [`Ticket`] or [`Attachment`]. All of them implement [`Record`] (ids,
//! timestamps, defaults, validation, default datasets) on top of the
//! [`portal_search::Searchable`] capability.

pub mod attachment;
pub mod defect_group;
pub mod error;
pub mod party;
pub mod record;
pub mod ticket;
pub mod timestamp;

pub use attachment::*;
pub use defect_group::*;
pub use error::*;
pub use party::*;
pub use record::*;
pub use ticket::*;
