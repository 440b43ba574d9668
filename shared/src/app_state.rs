//! 应用文档 (AppState)
//!
//! The root document: every read loads the whole value, every write replaces
//! the whole value. `findings`, `capas` and `evidence` are required on
//! deserialization; a payload missing any of them is rejected as a whole.
//! Entries inside the arrays are read leniently (see `models::lenient`).

use serde::{Deserialize, Serialize};

use crate::models::{Capa, EvidenceDoc, Finding};
use crate::types::IsoTimestamp;

/// Root persisted document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub findings: Vec<Finding>,
    pub capas: Vec<Capa>,
    pub evidence: Vec<EvidenceDoc>,
    #[serde(default)]
    pub last_saved: IsoTimestamp,
}

impl AppState {
    /// Fresh document with three empty sequences
    pub fn empty(now: impl Into<IsoTimestamp>) -> Self {
        Self {
            findings: Vec::new(),
            capas: Vec::new(),
            evidence: Vec::new(),
            last_saved: now.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty() && self.capas.is_empty() && self.evidence.is_empty()
    }

    pub fn finding(&self, id: &str) -> Option<&Finding> {
        self.findings.iter().find(|f| f.id == id)
    }

    pub fn capa(&self, id: &str) -> Option<&Capa> {
        self.capas.iter().find(|c| c.id == id)
    }

    /// CAPA owned by the given finding, if any
    pub fn capa_for_finding(&self, finding_id: &str) -> Option<&Capa> {
        self.capas.iter().find(|c| c.finding_id == finding_id)
    }

    /// Findings that can still receive a CAPA (no link yet)
    pub fn unlinked_findings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.linked_capa_id.is_none())
    }

    /// Check the bidirectional Finding ↔ CAPA link, returning one message per
    /// violation. Orphaned CAPAs (owning finding deleted) are allowed and not
    /// reported.
    pub fn link_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        for finding in &self.findings {
            let Some(capa_id) = &finding.linked_capa_id else {
                continue;
            };
            match self.capa(capa_id) {
                None => violations.push(format!(
                    "finding {} links missing CAPA {}",
                    finding.id, capa_id
                )),
                Some(capa) if capa.finding_id != finding.id => violations.push(format!(
                    "finding {} links CAPA {} owned by finding {}",
                    finding.id, capa_id, capa.finding_id
                )),
                Some(_) => {}
            }
        }
        for capa in &self.capas {
            if let Some(finding) = self.finding(&capa.finding_id)
                && finding.linked_capa_id.as_deref() != Some(capa.id.as_str())
            {
                violations.push(format!(
                    "CAPA {} owned by finding {} which does not link back",
                    capa.id, finding.id
                ));
            }
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CapaStatus, Category, Severity};

    #[test]
    fn test_empty_document_json() {
        let doc = AppState::empty("2025-01-01T00:00:00.000Z");
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "findings": [],
                "capas": [],
                "evidence": [],
                "lastSaved": "2025-01-01T00:00:00.000Z"
            })
        );
    }

    #[test]
    fn test_partial_document_is_rejected() {
        assert!(serde_json::from_str::<AppState>(r#"{"findings": []}"#).is_err());
        assert!(
            serde_json::from_str::<AppState>(r#"{"findings": [], "capas": [], "evidence": {}}"#)
                .is_err()
        );
    }

    #[test]
    fn test_odd_entry_keeps_document() {
        let raw = r#"{
            "findings": [
                {"id": "f1", "title": "A", "severity": "critical", "status": "Open"},
                {"id": "f2", "title": "B", "severity": "Major", "category": null}
            ],
            "capas": [{"id": "c1", "findingId": "f2", "status": "Closed"}],
            "evidence": []
        }"#;
        let doc: AppState = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.findings.len(), 2);
        assert_eq!(doc.findings[0].severity, Severity::Minor);
        assert_eq!(doc.findings[1].severity, Severity::Major);
        assert_eq!(doc.findings[1].category, Category::Other);
        assert_eq!(doc.capas[0].status, CapaStatus::Open);
    }

    #[test]
    fn test_missing_last_saved_is_tolerated() {
        let doc: AppState =
            serde_json::from_str(r#"{"findings": [], "capas": [], "evidence": []}"#).unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.last_saved, "");
    }

    #[test]
    fn test_original_document_parses() {
        let raw = r#"{
            "findings": [{
                "id": "f1", "title": "Missing CPR/First Aid certs", "comarRef": "10.07.14.22",
                "severity": "Major", "notes": "", "pageRef": "3", "status": "Open",
                "category": "Personnel", "linkedCapaId": "c1",
                "createdAt": "2025-01-01T00:00:00.000Z", "updatedAt": "2025-01-01T00:00:00.000Z"
            }],
            "capas": [{
                "id": "c1", "findingId": "f1", "deficiencySummary": "Certs lapsed",
                "rootCause": "", "correctiveAction": "Renew", "status": "In Progress",
                "verificationNotes": "", "evidenceDocIds": [],
                "createdAt": "2025-01-01T00:00:00.000Z", "updatedAt": "2025-01-01T00:00:00.000Z"
            }],
            "evidence": [{
                "id": "e1", "fileKey": "k1", "fileName": "roster.pdf", "mime": "application/pdf",
                "size": 1024, "linkedCapaId": "c1", "uploadedAt": "2025-01-01T00:00:00.000Z"
            }],
            "lastSaved": "2025-01-01T00:00:00.000Z"
        }"#;
        let doc: AppState = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.findings.len(), 1);
        assert_eq!(doc.capa_for_finding("f1").unwrap().id, "c1");
        assert_eq!(doc.evidence[0].size, 1024);
        assert!(doc.link_violations().is_empty());
        assert_eq!(doc.unlinked_findings().count(), 0);
    }
}
