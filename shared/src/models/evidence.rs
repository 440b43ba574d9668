//! Evidence Document Model

use serde::{Deserialize, Serialize};

use super::lenient;
use crate::types::{Id, IsoTimestamp};

/// Metadata for an uploaded evidence file
///
/// File bytes live in an external blob store keyed by `file_key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceDoc {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: Id,
    #[serde(default, deserialize_with = "lenient::string")]
    pub file_key: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub file_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub mime: String,
    /// Size in bytes
    #[serde(default, deserialize_with = "lenient::size")]
    pub size: u64,
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub linked_finding_id: Option<Id>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub linked_capa_id: Option<Id>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub uploaded_at: IsoTimestamp,
}
