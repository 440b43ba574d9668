//! Command dispatch
//!
//! Listings and exports go to the given writer; operation outcomes are
//! reported by the tracker's notifier.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use audit_store::AuditTracker;
use audit_store::stats::ActivityKind;
use shared::models::{Capa, CapaCreate, CapaUpdate, Finding, FindingCreate, FindingUpdate};

use crate::cli::{CapaAction, Command, FindingAction};

pub fn run(command: Command, tracker: &AuditTracker, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Finding { action } => finding(action, tracker, out),
        Command::Capa { action } => capa(action, tracker, out),
        Command::Summary { json } => summary(tracker, json, out),
        Command::Export => export(tracker, out),
    }
}

fn finding(action: FindingAction, tracker: &AuditTracker, out: &mut impl Write) -> Result<()> {
    match action {
        FindingAction::Add(fields) => {
            tracker.add_finding(FindingCreate {
                title: fields.title,
                comar_ref: fields.comar_ref,
                severity: fields.severity,
                category: fields.category,
                notes: fields.notes,
                page_ref: fields.page_ref,
            })?;
        }
        FindingAction::Bulk {
            file,
            severity,
            category,
        } => {
            let text = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => {
                    let mut text = String::new();
                    std::io::stdin()
                        .read_to_string(&mut text)
                        .context("reading stdin")?;
                    text
                }
            };
            tracker.import_lines(&text, severity, category)?;
        }
        FindingAction::Import { file } => {
            tracker.import_csv_file(&file)?;
        }
        FindingAction::Edit { id, fields } => {
            tracker.update_finding(
                &id,
                FindingUpdate {
                    title: fields.title,
                    comar_ref: fields.comar_ref,
                    severity: fields.severity,
                    category: fields.category,
                    notes: fields.notes,
                    page_ref: fields.page_ref,
                    status: fields.status,
                },
            )?;
        }
        FindingAction::Toggle { id } => {
            tracker.toggle_finding_status(&id)?;
        }
        FindingAction::Delete { id } => {
            tracker.delete_finding(&id)?;
        }
        FindingAction::List { open } => {
            let findings = tracker.findings();
            for f in findings.iter().filter(|f| !open || f.is_open()) {
                write_finding(out, f)?;
            }
        }
    }
    Ok(())
}

fn capa(action: CapaAction, tracker: &AuditTracker, out: &mut impl Write) -> Result<()> {
    match action {
        CapaAction::Create {
            finding_id,
            summary,
            action,
            root_cause,
            responsible,
            due,
        } => {
            tracker.create_capa(CapaCreate {
                finding_id,
                deficiency_summary: summary,
                root_cause,
                corrective_action: action,
                responsible_person: responsible,
                due_date: due,
            })?;
        }
        CapaAction::Edit {
            id,
            summary,
            action,
            root_cause,
            responsible,
            due,
            status,
            verification_notes,
        } => {
            tracker.update_capa(
                &id,
                CapaUpdate {
                    deficiency_summary: summary,
                    root_cause,
                    corrective_action: action,
                    responsible_person: responsible,
                    due_date: due,
                    status,
                    verification_notes,
                    evidence_doc_ids: None,
                },
            )?;
        }
        CapaAction::Delete { id } => {
            tracker.delete_capa(&id)?;
        }
        CapaAction::List => {
            for c in tracker.capas() {
                write_capa(out, &c)?;
            }
        }
        CapaAction::Candidates => {
            for f in tracker.unlinked_findings() {
                write_finding(out, &f)?;
            }
        }
    }
    Ok(())
}

fn write_finding(out: &mut impl Write, f: &Finding) -> Result<()> {
    let capa = f.linked_capa_id.as_deref().unwrap_or("-");
    writeln!(
        out,
        "{}\t{}\t{}\t{}\t{}\tcapa={}",
        f.id, f.status, f.severity, f.category, f.title, capa
    )?;
    Ok(())
}

fn write_capa(out: &mut impl Write, c: &Capa) -> Result<()> {
    let due = c.due_date.as_deref().map(|d| d.get(..10).unwrap_or(d)).unwrap_or("-");
    let owner = c.responsible_person.as_deref().unwrap_or("-");
    writeln!(
        out,
        "{}\t{}\tfinding={}\tdue={}\towner={}\t{}",
        c.id, c.status, c.finding_id, due, owner, c.deficiency_summary
    )?;
    Ok(())
}

fn summary(tracker: &AuditTracker, json: bool, out: &mut impl Write) -> Result<()> {
    let summary = tracker.summary();
    if json {
        serde_json::to_writer_pretty(&mut *out, &summary)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "Open findings:     {}", summary.open_findings)?;
    writeln!(out, "Open CAPAs:        {}", summary.open_capas)?;
    writeln!(out, "Total findings:    {}", summary.total_findings)?;
    writeln!(out, "Total CAPAs:       {}", summary.total_capas)?;
    writeln!(out, "Evidence:          {}", summary.evidence_count)?;
    writeln!(out, "Expiring evidence: {}", summary.expiring_evidence)?;
    if !summary.recent_activity.is_empty() {
        writeln!(out, "Recent activity:")?;
        for item in &summary.recent_activity {
            let kind = match item.kind {
                ActivityKind::Finding => "finding",
                ActivityKind::Capa => "capa",
            };
            writeln!(out, "  {}  {:<7} {}", item.updated_at, kind, item.title)?;
        }
    }
    Ok(())
}

/// Stored bytes as-is; the empty document when nothing is stored yet
fn export(tracker: &AuditTracker, out: &mut impl Write) -> Result<()> {
    match tracker.store().read_raw()? {
        Some(raw) => out.write_all(&raw)?,
        None => serde_json::to_writer(&mut *out, &tracker.document())?,
    }
    writeln!(out)?;
    Ok(())
}
