//! Finding Model (审计发现)

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::lenient;

use crate::types::{Id, IsoTimestamp};

/// Finding severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    Critical,
    Major,
    Minor,
}

impl Default for Severity {
    fn default() -> Self {
        Self::Minor
    }
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Critical, Severity::Major, Severity::Minor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::Major => "Major",
            Severity::Minor => "Minor",
        }
    }

    /// Exact (trimmed, case-sensitive) match on the variant name
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    /// Lenient conversion used by imports: unknown input falls back to `Minor`
    pub fn coerce(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stored values are read leniently, see [`Severity::coerce`]
impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(lenient::text(deserializer)?
            .map(|value| Self::coerce(&value))
            .unwrap_or_default())
    }
}

/// Finding category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Personnel,
    Medication,
    Safety,
    Other,
}

impl Default for Category {
    fn default() -> Self {
        Self::Other
    }
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Personnel,
        Category::Medication,
        Category::Safety,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Personnel => "Personnel",
            Category::Medication => "Medication",
            Category::Safety => "Safety",
            Category::Other => "Other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }

    /// Lenient conversion used by imports: unknown input falls back to `Other`
    pub fn coerce(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stored values are read leniently, see [`Category::coerce`]
impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(lenient::text(deserializer)?
            .map(|value| Self::coerce(&value))
            .unwrap_or_default())
    }
}

/// Finding status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FindingStatus {
    Open,
    Resolved,
}

impl Default for FindingStatus {
    fn default() -> Self {
        Self::Open
    }
}

impl FindingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingStatus::Open => "Open",
            FindingStatus::Resolved => "Resolved",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Open" => Some(FindingStatus::Open),
            "Resolved" => Some(FindingStatus::Resolved),
            _ => None,
        }
    }

    /// Unknown input falls back to `Open`
    pub fn coerce(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }

    /// Open ↔ Resolved
    pub fn toggled(self) -> Self {
        match self {
            FindingStatus::Open => FindingStatus::Resolved,
            FindingStatus::Resolved => FindingStatus::Open,
        }
    }
}

impl fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stored values are read leniently, see [`FindingStatus::coerce`]
impl<'de> Deserialize<'de> for FindingStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(lenient::text(deserializer)?
            .map(|value| Self::coerce(&value))
            .unwrap_or_default())
    }
}

/// Finding record - one reported deficiency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: Id,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    /// Regulatory reference label (e.g. "COMAR 10.07.14.22"), free text
    #[serde(default, deserialize_with = "lenient::string")]
    pub comar_ref: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, deserialize_with = "lenient::string")]
    pub notes: String,
    /// Page of the survey report where the finding was cited
    #[serde(default, deserialize_with = "lenient::string")]
    pub page_ref: String,
    #[serde(default)]
    pub status: FindingStatus,
    #[serde(default)]
    pub category: Category,
    /// Back-reference to the CAPA raised against this finding
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub linked_capa_id: Option<Id>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub created_at: IsoTimestamp,
    #[serde(default, deserialize_with = "lenient::string")]
    pub updated_at: IsoTimestamp,
}

impl Finding {
    /// Build a fresh finding: status Open, no CAPA link, both timestamps = `now`
    pub fn new(id: Id, data: FindingCreate, now: &str) -> Self {
        Self {
            id,
            title: data.title.trim().to_string(),
            comar_ref: data.comar_ref.trim().to_string(),
            severity: data.severity,
            notes: data.notes.trim().to_string(),
            page_ref: data.page_ref.trim().to_string(),
            status: FindingStatus::Open,
            category: data.category,
            linked_capa_id: None,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    /// Apply a field patch; identity, `createdAt` and the CAPA link are untouched
    pub fn patched(mut self, update: &FindingUpdate, now: &str) -> Self {
        if let Some(title) = &update.title {
            self.title = title.trim().to_string();
        }
        if let Some(comar_ref) = &update.comar_ref {
            self.comar_ref = comar_ref.trim().to_string();
        }
        if let Some(severity) = update.severity {
            self.severity = severity;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(notes) = &update.notes {
            self.notes = notes.trim().to_string();
        }
        if let Some(page_ref) = &update.page_ref {
            self.page_ref = page_ref.trim().to_string();
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        self.updated_at = now.to_string();
        self
    }

    pub fn is_open(&self) -> bool {
        self.status == FindingStatus::Open
    }

    pub fn has_capa(&self) -> bool {
        self.linked_capa_id.is_some()
    }
}

/// Create finding payload (quick add / bulk paste / CSV row)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindingCreate {
    pub title: String,
    #[serde(default)]
    pub comar_ref: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub page_ref: String,
}

impl FindingCreate {
    /// Title-only payload with the given defaults (bulk paste)
    pub fn titled(title: impl Into<String>, severity: Severity, category: Category) -> Self {
        Self {
            title: title.into(),
            severity,
            category,
            ..Default::default()
        }
    }
}

/// Update finding payload (in-place field edits)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindingUpdate {
    pub title: Option<String>,
    pub comar_ref: Option<String>,
    pub severity: Option<Severity>,
    pub category: Option<Category>,
    pub notes: Option<String>,
    pub page_ref: Option<String>,
    pub status: Option<FindingStatus>,
}

impl FindingUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.comar_ref.is_none()
            && self.severity.is_none()
            && self.category.is_none()
            && self.notes.is_none()
            && self.page_ref.is_none()
            && self.status.is_none()
    }
}
