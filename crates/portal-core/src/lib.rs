//! Portal Core - page controllers for the portal admin pages
//!
//! This crate wires the record types of `portal-domain` to the filter engine
//! of `portal-search`:
//!
//! - **Store**: key/value persistence, one JSON array per `<entity>_<userId>` key
//! - **Collection**: CRUD, confirmed deletes, bulk activate/deactivate, imports
//! - **Controller**: one [`PageController`] per page, owning records, view state,
//!   storage, notifications and the debounced search input
//! - **View model**: pure record → row/page mapping, independent of rendering
//! - **Interchange**: JSON and comma-split CSV import/export
//! - **Config**: paging, debounce, search tuning and storage location
//!
//! # Architecture
//!
//! ```text
//! PageController ─┬─ RecordRepository<KeyValueStore>
//!                 ├─ RecordCollection<T: Record>
//!                 ├─ ViewState { criteria, selection, page }
//!                 ├─ FilterEngine + Debouncer
//!                 └─ Notifier
//! ```

pub mod collection;
pub mod config;
pub mod confirm;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod interchange;
pub mod notify;
pub mod selection;
pub mod store;
pub mod view_model;
pub mod view_state;

pub use collection::*;
pub use config::*;
pub use confirm::*;
pub use controller::*;
pub use debounce::*;
pub use error::*;
pub use interchange::*;
pub use notify::*;
pub use selection::*;
pub use store::*;
pub use view_model::*;
pub use view_state::*;
