//! Unified error codes for the audit tracker
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Finding errors
//! - 2xxx: CAPA errors
//! - 3xxx: Import errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 values so notifications and exported reports stay
/// stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Finding ====================
    /// Finding not found
    FindingNotFound = 1001,
    /// Finding title is empty
    FindingTitleRequired = 1002,

    // ==================== 2xxx: CAPA ====================
    /// CAPA not found
    CapaNotFound = 2001,
    /// No finding selected for a new CAPA
    CapaFindingRequired = 2002,
    /// Selected finding already has a CAPA
    CapaFindingAlreadyLinked = 2003,

    // ==================== 3xxx: Import ====================
    /// Import produced no usable rows or lines
    ImportEmpty = 3001,
    /// Tabular file could not be read or parsed
    ImportParseFailed = 3002,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Persistence backend failure
    StorageError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",

            // Finding
            ErrorCode::FindingNotFound => "Finding not found",
            ErrorCode::FindingTitleRequired => "Title is required.",

            // CAPA
            ErrorCode::CapaNotFound => "CAPA not found",
            ErrorCode::CapaFindingRequired => "Select a finding to link.",
            ErrorCode::CapaFindingAlreadyLinked => "Finding already has a CAPA",

            // Import
            ErrorCode::ImportEmpty => "Nothing to import",
            ErrorCode::ImportParseFailed => "Failed to parse CSV.",

            // System
            ErrorCode::InternalError => "Internal error",
            ErrorCode::StorageError => "Storage error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),

            // Finding
            1001 => Ok(ErrorCode::FindingNotFound),
            1002 => Ok(ErrorCode::FindingTitleRequired),

            // CAPA
            2001 => Ok(ErrorCode::CapaNotFound),
            2002 => Ok(ErrorCode::CapaFindingRequired),
            2003 => Ok(ErrorCode::CapaFindingAlreadyLinked),

            // Import
            3001 => Ok(ErrorCode::ImportEmpty),
            3002 => Ok(ErrorCode::ImportParseFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::StorageError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::FindingNotFound.code(), 1001);
        assert_eq!(ErrorCode::CapaFindingAlreadyLinked.code(), 2003);
        assert_eq!(ErrorCode::ImportParseFailed.code(), 3002);
        assert_eq!(ErrorCode::StorageError.code(), 9002);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::ImportEmpty.is_success());
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
        assert_eq!(
            InvalidErrorCode(4242).to_string(),
            "invalid error code: 4242"
        );
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::CapaNotFound).unwrap();
        assert_eq!(json, "2001");

        let code: ErrorCode = serde_json::from_str("3001").unwrap();
        assert_eq!(code, ErrorCode::ImportEmpty);

        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::Success.to_string(), "E0000");
        assert_eq!(ErrorCode::FindingNotFound.to_string(), "E1001");
    }

    #[test]
    fn test_roundtrip_all_codes() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::Unknown,
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::InvalidFormat,
            ErrorCode::RequiredField,
            ErrorCode::FindingNotFound,
            ErrorCode::FindingTitleRequired,
            ErrorCode::CapaNotFound,
            ErrorCode::CapaFindingRequired,
            ErrorCode::CapaFindingAlreadyLinked,
            ErrorCode::ImportEmpty,
            ErrorCode::ImportParseFailed,
            ErrorCode::InternalError,
            ErrorCode::StorageError,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }
}
