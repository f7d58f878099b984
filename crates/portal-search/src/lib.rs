//! portal-search: Searchable records, fuzzy matching and the filter/sort engine.
//!
//! Records expose their fields through [`Searchable`]. A [`FilterEngine`]
//! narrows and orders a borrowed collection according to [`FilterCriteria`]:
//! free text (plain substring or smart pattern routing with a fuzzy
//! fallback), per-field filters, chip facets and a stable sort.

pub mod config;
pub mod criteria;
pub mod engine;
pub mod fuzzy;
pub mod searchable;
pub mod smart;

pub use config::*;
pub use criteria::*;
pub use engine::*;
pub use fuzzy::*;
pub use searchable::*;
pub use smart::*;
