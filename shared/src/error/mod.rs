//! Unified error system for the audit tracker
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Finding errors
//! - 2xxx: CAPA errors
//! - 3xxx: Import errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::FindingTitleRequired);
//! assert_eq!(err.message, "Title is required.");
//!
//! let err = AppError::validation("Due date must be YYYY-MM-DD")
//!     .with_detail("field", "dueDate");
//! assert!(err.is_validation());
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};
