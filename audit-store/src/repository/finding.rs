//! Finding Repository

use shared::AppState;
use shared::error::{AppError, AppResult};
use shared::models::{Finding, FindingUpdate};

use super::commit;
use crate::store::StateStore;

// ── Transformers ────────────────────────────────────────────────────

/// Append findings in the given order
pub fn apply_add(mut doc: AppState, findings: Vec<Finding>) -> AppState {
    doc.findings.extend(findings);
    doc
}

/// Replace the finding's fields in place
pub fn apply_update(
    mut doc: AppState,
    id: &str,
    data: &FindingUpdate,
    now: &str,
) -> AppResult<AppState> {
    let idx = position(&doc, id)?;
    let current = doc.findings[idx].clone();
    doc.findings[idx] = current.patched(data, now);
    Ok(doc)
}

/// Open ↔ Resolved
pub fn apply_toggle_status(mut doc: AppState, id: &str, now: &str) -> AppResult<AppState> {
    let idx = position(&doc, id)?;
    let finding = &mut doc.findings[idx];
    finding.status = finding.status.toggled();
    finding.updated_at = now.to_string();
    Ok(doc)
}

/// Remove the finding. A linked CAPA stays in place as an orphan.
pub fn apply_delete(mut doc: AppState, id: &str) -> AppResult<AppState> {
    let idx = position(&doc, id)?;
    doc.findings.remove(idx);
    Ok(doc)
}

fn position(doc: &AppState, id: &str) -> AppResult<usize> {
    doc.findings
        .iter()
        .position(|f| f.id == id)
        .ok_or_else(|| AppError::finding_not_found(id))
}

// ── Store-bound operations ──────────────────────────────────────────

pub fn find_all(store: &StateStore) -> Vec<Finding> {
    store.load_document().findings
}

pub fn find_by_id(store: &StateStore, id: &str) -> Option<Finding> {
    store.load_document().finding(id).cloned()
}

/// Findings that can still receive a CAPA
pub fn find_unlinked(store: &StateStore) -> Vec<Finding> {
    store.load_document().unlinked_findings().cloned().collect()
}

pub fn add(store: &StateStore, findings: Vec<Finding>) -> AppResult<AppState> {
    let count = findings.len();
    let doc = store.update_document(|doc| apply_add(doc, findings))?;
    tracing::debug!(count, total = doc.findings.len(), "Findings added");
    Ok(doc)
}

pub fn update(store: &StateStore, id: &str, data: &FindingUpdate) -> AppResult<AppState> {
    let now = store.clock().now_iso();
    commit(store, |doc| apply_update(doc, id, data, &now))
}

pub fn toggle_status(store: &StateStore, id: &str) -> AppResult<AppState> {
    let now = store.clock().now_iso();
    commit(store, |doc| apply_toggle_status(doc, id, &now))
}

pub fn delete(store: &StateStore, id: &str) -> AppResult<AppState> {
    let doc = commit(store, |doc| apply_delete(doc, id))?;
    tracing::debug!(finding_id = %id, "Finding deleted");
    Ok(doc)
}
