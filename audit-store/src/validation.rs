//! Input validation helpers
//!
//! Centralized text length constants and validation functions. Every check
//! runs before the store is touched, so a rejected input never changes the
//! document. The limits only stop runaway pastes; a pasted survey line of
//! any realistic length is accepted.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{CapaCreate, CapaUpdate, FindingCreate, FindingUpdate};

// ── Text length limits ──────────────────────────────────────────────

/// Finding titles, CAPA deficiency summaries
pub const MAX_TITLE_LEN: usize = 10_000;

/// Notes, root cause, corrective action, verification notes
pub const MAX_NOTE_LEN: usize = 100_000;

/// Short labels: COMAR reference, page reference, responsible person
pub const MAX_SHORT_TEXT_LEN: usize = 2_000;

// ── Generic helpers ─────────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
///
/// `message` is the user-facing text for the empty case.
pub fn validate_required_text(
    value: &str,
    field: &str,
    message: &str,
    max_len: usize,
) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::required(field, message));
    }
    validate_text_len(value, field, max_len)
}

/// Validate that a string is within the length limit.
pub fn validate_text_len(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    let len = value.chars().count();
    if len > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({len} chars, max {max_len})"
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> AppResult<()> {
    if let Some(v) = value {
        validate_text_len(v, field, max_len)?;
    }
    Ok(())
}

// ── Finding ─────────────────────────────────────────────────────────

fn validate_finding_title(title: &str) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::new(ErrorCode::FindingTitleRequired).with_detail("field", "title"));
    }
    validate_text_len(title, "title", MAX_TITLE_LEN)
}

/// Quick add / bulk / import payload
pub fn validate_finding_create(data: &FindingCreate) -> AppResult<()> {
    validate_finding_title(&data.title)?;
    validate_text_len(&data.comar_ref, "comarRef", MAX_SHORT_TEXT_LEN)?;
    validate_text_len(&data.page_ref, "pageRef", MAX_SHORT_TEXT_LEN)?;
    validate_text_len(&data.notes, "notes", MAX_NOTE_LEN)?;
    Ok(())
}

/// In-place edit; a title, when edited, must stay non-empty
pub fn validate_finding_update(data: &FindingUpdate) -> AppResult<()> {
    if data.is_empty() {
        return Err(AppError::validation("Nothing to update"));
    }
    if let Some(title) = &data.title {
        validate_finding_title(title)?;
    }
    validate_optional_text(&data.comar_ref, "comarRef", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.page_ref, "pageRef", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.notes, "notes", MAX_NOTE_LEN)?;
    Ok(())
}

// ── CAPA ────────────────────────────────────────────────────────────

/// Create payload: a finding must be selected, summary and action non-empty
pub fn validate_capa_create(data: &CapaCreate) -> AppResult<()> {
    if data.finding_id.trim().is_empty() {
        return Err(
            AppError::new(ErrorCode::CapaFindingRequired).with_detail("field", "findingId")
        );
    }
    validate_required_text(
        &data.deficiency_summary,
        "deficiencySummary",
        "Deficiency summary is required.",
        MAX_TITLE_LEN,
    )?;
    validate_required_text(
        &data.corrective_action,
        "correctiveAction",
        "Corrective action is required.",
        MAX_NOTE_LEN,
    )?;
    validate_text_len(&data.root_cause, "rootCause", MAX_NOTE_LEN)?;
    validate_text_len(&data.responsible_person, "responsiblePerson", MAX_SHORT_TEXT_LEN)?;
    Ok(())
}

/// In-place edit; summary and action, when edited, must stay non-empty
pub fn validate_capa_update(data: &CapaUpdate) -> AppResult<()> {
    if let Some(summary) = &data.deficiency_summary {
        validate_required_text(
            summary,
            "deficiencySummary",
            "Deficiency summary is required.",
            MAX_TITLE_LEN,
        )?;
    }
    if let Some(action) = &data.corrective_action {
        validate_required_text(
            action,
            "correctiveAction",
            "Corrective action is required.",
            MAX_NOTE_LEN,
        )?;
    }
    validate_optional_text(&data.root_cause, "rootCause", MAX_NOTE_LEN)?;
    validate_optional_text(&data.verification_notes, "verificationNotes", MAX_NOTE_LEN)?;
    validate_optional_text(&data.responsible_person, "responsiblePerson", MAX_SHORT_TEXT_LEN)?;
    Ok(())
}
