//! Data models
//!
//! Field names serialize as camelCase: these structs define the persisted
//! document format. All IDs are opaque strings, all timestamps RFC 3339.

pub mod capa;
pub mod evidence;
pub mod finding;
mod lenient;

// Re-exports
pub use capa::*;
pub use evidence::*;
pub use finding::*;
