//! End-to-end tracker flows: findings, CAPA linkage and bulk import
//! Run: cargo test -p audit-store --test tracker_flows

use std::io::Write;
use std::sync::Arc;

use audit_store::{
    AuditTracker, FixedClock, NotifyLevel, RecordingNotifier, RedbBackend, SequentialIds,
    StateStore,
};
use chrono::Duration;
use shared::error::ErrorCode;
use shared::models::{
    CapaCreate, CapaStatus, CapaUpdate, Category, FindingCreate, FindingStatus, FindingUpdate,
    Severity,
};

struct Harness {
    tracker: AuditTracker,
    clock: Arc<FixedClock>,
    notifier: Arc<RecordingNotifier>,
    dir: tempfile::TempDir,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(FixedClock::at("2025-05-01T09:00:00Z"));
    let notifier = Arc::new(RecordingNotifier::new());
    let store = StateStore::new(RedbBackend::open(dir.path().join("audit.redb")).unwrap())
        .with_clock(clock.clone());
    let tracker = AuditTracker::new(store)
        .with_ids(Arc::new(SequentialIds::new("id")))
        .with_notifier(notifier.clone());
    Harness {
        tracker,
        clock,
        notifier,
        dir,
    }
}

fn capa_for(finding_id: &str) -> CapaCreate {
    CapaCreate {
        finding_id: finding_id.into(),
        deficiency_summary: "Medication refrigerator log incomplete".into(),
        root_cause: "No night-shift owner".into(),
        corrective_action: "Assign log to charge nurse".into(),
        responsible_person: "DON".into(),
        due_date: "2025-06-15".into(),
    }
}

#[test]
fn bulk_text_creates_one_finding_per_line() {
    let h = harness();
    let doc = h
        .tracker
        .import_lines("A\n\nB\n  \nC", Severity::Major, Category::Safety)
        .unwrap();

    let titles: Vec<_> = doc.findings.iter().map(|f| f.title.as_str()).collect();
    assert_eq!(titles, ["A", "B", "C"]);
    for f in &doc.findings {
        assert_eq!(f.severity, Severity::Major);
        assert_eq!(f.category, Category::Safety);
        assert_eq!(f.status, FindingStatus::Open);
        assert_eq!(f.created_at, "2025-05-01T09:00:00.000Z");
    }
    assert_eq!(h.notifier.last().unwrap().message, "Added 3 findings.");
}

#[test]
fn bulk_text_keeps_long_lines() {
    let h = harness();
    let long = "x".repeat(501);
    let doc = h
        .tracker
        .import_lines(&format!("A\n{long}\nC"), Severity::Major, Category::Safety)
        .unwrap();

    assert_eq!(doc.findings.len(), 3);
    assert_eq!(doc.findings[1].title, long);
    assert_eq!(h.notifier.last().unwrap().message, "Added 3 findings.");
}

#[test]
fn quick_add_whitespace_title_changes_nothing() {
    let h = harness();
    h.tracker
        .add_finding(FindingCreate::titled("Existing", Severity::Minor, Category::Other))
        .unwrap();
    let before = h.tracker.document();

    h.clock.advance(Duration::minutes(5));
    let err = h
        .tracker
        .add_finding(FindingCreate::titled(" \t ", Severity::Critical, Category::Safety))
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(h.tracker.document(), before);
    assert_eq!(h.notifier.last().unwrap().level, NotifyLevel::Error);
}

#[test]
fn bulk_add_rejects_whole_batch_on_one_bad_title() {
    let h = harness();
    let err = h
        .tracker
        .add_findings(vec![
            FindingCreate::titled("Good", Severity::Minor, Category::Other),
            FindingCreate::titled("", Severity::Minor, Category::Other),
        ])
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::FindingTitleRequired);
    assert!(h.tracker.findings().is_empty());
}

#[test]
fn create_capa_links_finding() {
    let h = harness();
    h.tracker
        .add_finding(FindingCreate::titled("Fridge log", Severity::Major, Category::Medication))
        .unwrap();

    h.clock.advance(Duration::hours(1));
    let doc = h.tracker.create_capa(capa_for("id-1")).unwrap();

    let owned: Vec<_> = doc.capas.iter().filter(|c| c.finding_id == "id-1").collect();
    assert_eq!(owned.len(), 1);
    let capa = owned[0];
    assert_eq!(capa.status, CapaStatus::Open);
    assert_eq!(capa.due_date.as_deref(), Some("2025-06-15T00:00:00.000Z"));
    assert_eq!(capa.responsible_person.as_deref(), Some("DON"));

    let finding = doc.finding("id-1").unwrap();
    assert_eq!(finding.linked_capa_id.as_deref(), Some(capa.id.as_str()));
    assert_eq!(finding.updated_at, "2025-05-01T10:00:00.000Z");
    assert!(doc.link_violations().is_empty());
    assert_eq!(h.notifier.last().unwrap().message, "CAPA created and linked.");
}

#[test]
fn linked_finding_is_no_longer_a_candidate() {
    let h = harness();
    h.tracker
        .import_lines("First\nSecond", Severity::Minor, Category::Other)
        .unwrap();
    h.tracker.create_capa(capa_for("id-1")).unwrap();

    let candidates: Vec<_> = h.tracker.unlinked_findings().into_iter().map(|f| f.id).collect();
    assert_eq!(candidates, ["id-2"]);

    let err = h.tracker.create_capa(capa_for("id-1")).unwrap_err();
    assert_eq!(err.code, ErrorCode::CapaFindingAlreadyLinked);
    assert_eq!(h.tracker.capas().len(), 1);
}

#[test]
fn create_capa_requires_selection() {
    let h = harness();
    let err = h.tracker.create_capa(capa_for("")).unwrap_err();
    assert_eq!(err.code, ErrorCode::CapaFindingRequired);
    assert_eq!(h.notifier.last().unwrap().message, "Select a finding to link.");
    assert!(h.tracker.store().read_raw().unwrap().is_none());
}

#[test]
fn delete_capa_clears_link() {
    let h = harness();
    h.tracker
        .add_finding(FindingCreate::titled("Fridge log", Severity::Major, Category::Medication))
        .unwrap();
    h.tracker.create_capa(capa_for("id-1")).unwrap();

    let doc = h.tracker.delete_capa("id-2").unwrap();
    assert!(doc.capa("id-2").is_none());
    assert!(doc.finding("id-1").unwrap().linked_capa_id.is_none());
    assert_eq!(h.tracker.unlinked_findings().len(), 1);
}

#[test]
fn delete_finding_orphans_capa() {
    let h = harness();
    h.tracker
        .add_finding(FindingCreate::titled("Fridge log", Severity::Major, Category::Medication))
        .unwrap();
    h.tracker.create_capa(capa_for("id-1")).unwrap();

    let doc = h.tracker.delete_finding("id-1").unwrap();
    assert!(doc.findings.is_empty());
    assert_eq!(doc.capas.len(), 1);
    assert_eq!(doc.capas[0].finding_id, "id-1");
}

#[test]
fn edit_and_toggle_keep_identity() {
    let h = harness();
    h.tracker
        .add_finding(FindingCreate::titled("Door alarm", Severity::Minor, Category::Safety))
        .unwrap();

    h.clock.advance(Duration::days(1));
    h.tracker
        .update_finding(
            "id-1",
            FindingUpdate {
                notes: Some("Alarm disabled at night".into()),
                severity: Some(Severity::Critical),
                ..Default::default()
            },
        )
        .unwrap();
    let doc = h.tracker.toggle_finding_status("id-1").unwrap();

    let f = doc.finding("id-1").unwrap();
    assert_eq!(f.status, FindingStatus::Resolved);
    assert_eq!(f.severity, Severity::Critical);
    assert_eq!(f.notes, "Alarm disabled at night");
    assert_eq!(f.created_at, "2025-05-01T09:00:00.000Z");
    assert_eq!(f.updated_at, "2025-05-02T09:00:00.000Z");
}

#[test]
fn missing_entities_are_not_found() {
    let h = harness();
    assert_eq!(
        h.tracker.toggle_finding_status("nope").unwrap_err().code,
        ErrorCode::FindingNotFound
    );
    assert_eq!(
        h.tracker
            .update_capa(
                "nope",
                CapaUpdate {
                    status: Some(CapaStatus::Done),
                    ..Default::default()
                }
            )
            .unwrap_err()
            .code,
        ErrorCode::CapaNotFound
    );
    assert_eq!(h.tracker.delete_capa("nope").unwrap_err().code, ErrorCode::CapaNotFound);
}

#[test]
fn csv_import_coerces_and_skips() {
    let h = harness();
    let csv = "title,comarRef,severity,notes,pageRef,category\n\
               Fire drill overdue,10.07.14.30,Catastrophic,,p. 2,Safety\n\
               ,10.07.14.31,Major,,,Other\n\
               \n\
               MAR gaps,10.07.14.22,Critical,Night shift,p. 4,Medication\n";

    let doc = h.tracker.import_csv_reader(csv.as_bytes()).unwrap();

    assert_eq!(doc.findings.len(), 2);
    assert_eq!(doc.findings[0].title, "Fire drill overdue");
    assert_eq!(doc.findings[0].severity, Severity::Minor);
    assert_eq!(doc.findings[0].category, Category::Safety);
    assert_eq!(doc.findings[1].severity, Severity::Critical);
    assert_eq!(doc.findings[1].notes, "Night shift");
    assert_eq!(h.notifier.last().unwrap().message, "Added 2 findings.");
}

#[test]
fn csv_import_header_only_is_empty() {
    let h = harness();
    let err = h
        .tracker
        .import_csv_reader("title,severity\n".as_bytes())
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::ImportEmpty);
    assert_eq!(h.notifier.last().unwrap().message, "CSV appears empty.");
    assert!(h.tracker.findings().is_empty());
}

#[test]
fn csv_import_from_file() {
    let h = harness();
    let path = h.dir.path().join("findings.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "title,severity,category").unwrap();
    writeln!(file, "Expired CPR cards,Major,Personnel").unwrap();
    drop(file);

    let doc = h.tracker.import_csv_file(&path).unwrap();
    assert_eq!(doc.findings[0].category, Category::Personnel);
    assert_eq!(h.notifier.last().unwrap().message, "Added 1 finding.");
}

#[test]
fn csv_import_missing_file_fails_to_parse() {
    let h = harness();
    let err = h
        .tracker
        .import_csv_file(h.dir.path().join("missing.csv"))
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ImportParseFailed);
    assert_eq!(h.notifier.last().unwrap().message, "Failed to parse CSV.");
}

#[test]
fn summary_reflects_document() {
    let h = harness();
    h.tracker
        .import_lines("One\nTwo\nThree", Severity::Minor, Category::Other)
        .unwrap();
    h.tracker.toggle_finding_status("id-3").unwrap();
    h.tracker.create_capa(capa_for("id-1")).unwrap();
    h.tracker
        .update_capa(
            "id-4",
            CapaUpdate {
                status: Some(CapaStatus::InProgress),
                ..Default::default()
            },
        )
        .unwrap();

    let summary = h.tracker.summary();
    assert_eq!(summary.total_findings, 3);
    assert_eq!(summary.open_findings, 2);
    assert_eq!(summary.total_capas, 1);
    assert_eq!(summary.open_capas, 1);
    assert_eq!(summary.evidence_count, 0);
    assert_eq!(summary.recent_activity.len(), 4);
}
