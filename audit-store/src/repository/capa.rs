//! CAPA Repository
//!
//! Creating a CAPA links it to exactly one finding; deleting it clears the
//! link on every finding that points at it. Both sides are updated in the
//! same document write.

use shared::AppState;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Capa, CapaCreate, CapaStatus, CapaUpdate};
use shared::types::{Id, IsoTimestamp};

use super::commit;
use crate::store::StateStore;

/// Build a new CAPA from a validated create payload
///
/// Status starts Open with no verification notes and no evidence. A blank
/// responsible person is stored as unset.
pub fn build_capa(id: Id, data: CapaCreate, due_date: Option<IsoTimestamp>, now: &str) -> Capa {
    let person = data.responsible_person.trim();
    Capa {
        id,
        finding_id: data.finding_id.trim().to_string(),
        deficiency_summary: data.deficiency_summary.trim().to_string(),
        root_cause: data.root_cause.trim().to_string(),
        corrective_action: data.corrective_action.trim().to_string(),
        responsible_person: (!person.is_empty()).then(|| person.to_string()),
        due_date,
        status: CapaStatus::Open,
        verification_notes: String::new(),
        evidence_doc_ids: Vec::new(),
        created_at: now.to_string(),
        updated_at: now.to_string(),
    }
}

// ── Transformers ────────────────────────────────────────────────────

/// Append the CAPA and set `linkedCapaId` on its finding
///
/// The finding must exist and must not already carry a link.
pub fn apply_create(mut doc: AppState, capa: Capa, now: &str) -> AppResult<AppState> {
    let finding = doc
        .findings
        .iter_mut()
        .find(|f| f.id == capa.finding_id)
        .ok_or_else(|| AppError::finding_not_found(&capa.finding_id))?;

    if let Some(existing) = &finding.linked_capa_id {
        return Err(AppError::new(ErrorCode::CapaFindingAlreadyLinked)
            .with_detail("findingId", finding.id.clone())
            .with_detail("capaId", existing.clone()));
    }

    finding.linked_capa_id = Some(capa.id.clone());
    finding.updated_at = now.to_string();
    doc.capas.push(capa);
    Ok(doc)
}

/// Replace the CAPA's fields in place; `findingId` never changes
pub fn apply_update(
    mut doc: AppState,
    id: &str,
    data: &CapaUpdate,
    due_date: Option<Option<IsoTimestamp>>,
    now: &str,
) -> AppResult<AppState> {
    let idx = position(&doc, id)?;
    let current = doc.capas[idx].clone();
    doc.capas[idx] = current.patched(data, due_date, now);
    Ok(doc)
}

/// Remove the CAPA and clear every link pointing at it
pub fn apply_delete(mut doc: AppState, id: &str) -> AppResult<AppState> {
    let idx = position(&doc, id)?;
    doc.capas.remove(idx);
    for finding in &mut doc.findings {
        if finding.linked_capa_id.as_deref() == Some(id) {
            finding.linked_capa_id = None;
        }
    }
    Ok(doc)
}

fn position(doc: &AppState, id: &str) -> AppResult<usize> {
    doc.capas
        .iter()
        .position(|c| c.id == id)
        .ok_or_else(|| AppError::capa_not_found(id))
}

// ── Store-bound operations ──────────────────────────────────────────

pub fn find_all(store: &StateStore) -> Vec<Capa> {
    store.load_document().capas
}

pub fn find_by_id(store: &StateStore, id: &str) -> Option<Capa> {
    store.load_document().capa(id).cloned()
}

pub fn create(store: &StateStore, capa: Capa) -> AppResult<AppState> {
    let now = capa.created_at.clone();
    let capa_id = capa.id.clone();
    let finding_id = capa.finding_id.clone();
    let doc = commit(store, |doc| apply_create(doc, capa, &now))?;
    tracing::debug!(capa_id = %capa_id, finding_id = %finding_id, "CAPA created and linked");
    Ok(doc)
}

pub fn update(
    store: &StateStore,
    id: &str,
    data: &CapaUpdate,
    due_date: Option<Option<IsoTimestamp>>,
) -> AppResult<AppState> {
    let now = store.clock().now_iso();
    commit(store, |doc| apply_update(doc, id, data, due_date, &now))
}

pub fn delete(store: &StateStore, id: &str) -> AppResult<AppState> {
    let doc = commit(store, |doc| apply_delete(doc, id))?;
    tracing::debug!(capa_id = %id, "CAPA deleted");
    Ok(doc)
}
