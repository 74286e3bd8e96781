//! mediarag-vector
//!
//! LanceDB-backed vector collections. Each stored item gets its own table,
//! filled with embedded content chunks.
pub mod embed;
pub mod schema;
pub mod search;
pub mod store;
pub mod table;
pub mod writer;

pub use embed::HashEmbedder;
pub use store::LanceVectorStore;
