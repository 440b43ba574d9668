//! Shared types for the COMAR audit tracker
//!
//! The persisted document model (findings, CAPAs, evidence), payload types,
//! error codes, and time/id helpers used by the store and the CLI.

pub mod app_state;
pub mod error;
pub mod models;
pub mod types;
pub mod util;

// Re-exports
pub use app_state::AppState;
pub use error::{AppError, AppResult, ErrorCode};
pub use serde::{Deserialize, Serialize};
