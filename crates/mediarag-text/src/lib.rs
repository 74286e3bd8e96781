//! mediarag-text
//!
//! Tantivy-backed media store. One index holds every stored item, serves the
//! global full-text search and answers keyword tag lookups.
pub mod tantivy_utils;
pub mod index;
pub mod search;

pub use index::{NewItem, TantivyMediaStore};
