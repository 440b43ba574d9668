//! Dashboard summary

use serde::Serialize;
use shared::AppState;
use shared::types::{Id, IsoTimestamp};

/// Entries shown in the recent activity list
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Finding,
    Capa,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub kind: ActivityKind,
    pub id: Id,
    /// Finding title, or the CAPA's deficiency summary
    pub title: String,
    pub updated_at: IsoTimestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub open_findings: usize,
    /// Open or In Progress
    pub open_capas: usize,
    pub total_findings: usize,
    pub total_capas: usize,
    pub evidence_count: usize,
    /// Evidence carries no expiry date, so this is always zero
    pub expiring_evidence: usize,
    pub recent_activity: Vec<RecentActivity>,
}

impl DashboardSummary {
    pub fn from_state(doc: &AppState) -> Self {
        let findings = doc.findings.iter().map(|f| RecentActivity {
            kind: ActivityKind::Finding,
            id: f.id.clone(),
            title: f.title.clone(),
            updated_at: f.updated_at.clone(),
        });
        let capas = doc.capas.iter().map(|c| RecentActivity {
            kind: ActivityKind::Capa,
            id: c.id.clone(),
            title: c.deficiency_summary.clone(),
            updated_at: c.updated_at.clone(),
        });

        // Timestamps share one fixed-width format, so string order is time order
        let mut recent_activity: Vec<_> = findings.chain(capas).collect();
        recent_activity.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        recent_activity.truncate(RECENT_ACTIVITY_LIMIT);

        Self {
            open_findings: doc.findings.iter().filter(|f| f.is_open()).count(),
            open_capas: doc.capas.iter().filter(|c| c.status.is_active()).count(),
            total_findings: doc.findings.len(),
            total_capas: doc.capas.len(),
            evidence_count: doc.evidence.len(),
            expiring_evidence: 0,
            recent_activity,
        }
    }
}
