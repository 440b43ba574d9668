//! Common types for the shared crate

/// Opaque entity identifier
pub type Id = String;

/// RFC 3339 timestamp string as persisted in the document
pub type IsoTimestamp = String;
