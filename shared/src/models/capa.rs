//! CAPA Model (纠正与预防措施)

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::lenient;

use crate::types::{Id, IsoTimestamp};

/// CAPA status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CapaStatus {
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
}

impl Default for CapaStatus {
    fn default() -> Self {
        Self::Open
    }
}

impl CapaStatus {
    pub const ALL: [CapaStatus; 3] = [CapaStatus::Open, CapaStatus::InProgress, CapaStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            CapaStatus::Open => "Open",
            CapaStatus::InProgress => "In Progress",
            CapaStatus::Done => "Done",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    /// Unknown input falls back to `Open`
    pub fn coerce(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    /// Still needs work (counted as open on the dashboard)
    pub fn is_active(&self) -> bool {
        matches!(self, CapaStatus::Open | CapaStatus::InProgress)
    }
}

impl fmt::Display for CapaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<'de> Deserialize<'de> for CapaStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(lenient::text(deserializer)?
            .map(|value| Self::coerce(&value))
            .unwrap_or_default())
    }
}

/// Corrective-action plan for exactly one finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capa {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: Id,
    /// Owning finding, immutable after creation
    #[serde(default, deserialize_with = "lenient::string")]
    pub finding_id: Id,
    #[serde(default, deserialize_with = "lenient::string")]
    pub deficiency_summary: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub root_cause: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub corrective_action: String,
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub responsible_person: Option<String>,
    /// Full timestamp derived from a date input
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<IsoTimestamp>,
    #[serde(default)]
    pub status: CapaStatus,
    #[serde(default, deserialize_with = "lenient::string")]
    pub verification_notes: String,
    #[serde(default, deserialize_with = "lenient::id_list")]
    pub evidence_doc_ids: Vec<Id>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub created_at: IsoTimestamp,
    #[serde(default, deserialize_with = "lenient::string")]
    pub updated_at: IsoTimestamp,
}

impl Capa {
    /// Apply a field patch; `id`, `findingId` and `createdAt` never change
    pub fn patched(
        mut self,
        update: &CapaUpdate,
        due_date: Option<Option<IsoTimestamp>>,
        now: &str,
    ) -> Self {
        if let Some(summary) = &update.deficiency_summary {
            self.deficiency_summary = summary.trim().to_string();
        }
        if let Some(root_cause) = &update.root_cause {
            self.root_cause = root_cause.clone();
        }
        if let Some(action) = &update.corrective_action {
            self.corrective_action = action.trim().to_string();
        }
        if let Some(person) = &update.responsible_person {
            let person = person.trim();
            self.responsible_person = (!person.is_empty()).then(|| person.to_string());
        }
        if let Some(due_date) = due_date {
            self.due_date = due_date;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(notes) = &update.verification_notes {
            self.verification_notes = notes.clone();
        }
        if let Some(ids) = &update.evidence_doc_ids {
            self.evidence_doc_ids = ids.clone();
        }
        self.updated_at = now.to_string();
        self
    }
}

/// Create CAPA payload
///
/// `due_date` is the raw `YYYY-MM-DD` date input; blank means none.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapaCreate {
    /// Selected finding; empty when nothing has been selected
    #[serde(default)]
    pub finding_id: String,
    pub deficiency_summary: String,
    #[serde(default)]
    pub root_cause: String,
    pub corrective_action: String,
    #[serde(default)]
    pub responsible_person: String,
    #[serde(default)]
    pub due_date: String,
}

/// Update CAPA payload (in-place field edits)
///
/// `responsible_person: Some("")` clears the person and `due_date: Some("")`
/// clears the due date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapaUpdate {
    pub deficiency_summary: Option<String>,
    pub root_cause: Option<String>,
    pub corrective_action: Option<String>,
    pub responsible_person: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<CapaStatus>,
    pub verification_notes: Option<String>,
    pub evidence_doc_ids: Option<Vec<Id>>,
}
