//! Audit tracker facade
//!
//! Entry point for every user-facing operation. Each call validates its
//! input, runs the matching repository transformer through the store and
//! reports the outcome to the [`Notifier`]. A rejected call leaves the
//! persisted document untouched.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use shared::AppState;
use shared::error::{AppError, AppResult};
use shared::models::{
    Capa, CapaCreate, CapaUpdate, Category, Finding, FindingCreate, FindingUpdate, Severity,
};
use shared::util::date_input_to_timestamp;

use crate::clock::{IdGenerator, UuidGenerator};
use crate::config::Config;
use crate::notify::{Notifier, TracingNotifier};
use crate::repository::{capa, finding, import};
use crate::stats::DashboardSummary;
use crate::store::StateStore;
use crate::validation;

fn added_message(count: usize) -> String {
    if count == 1 {
        "Added 1 finding.".to_string()
    } else {
        format!("Added {count} findings.")
    }
}

pub struct AuditTracker {
    store: StateStore,
    ids: Arc<dyn IdGenerator>,
    notifier: Arc<dyn Notifier>,
}

impl AuditTracker {
    pub fn new(store: StateStore) -> Self {
        Self {
            store,
            ids: Arc::new(UuidGenerator),
            notifier: Arc::new(TracingNotifier),
        }
    }

    /// Open the configured store with production collaborators
    pub fn open(config: &Config) -> AppResult<Self> {
        Ok(Self::new(StateStore::open(config)?))
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Deliver the outcome and hand the result back unchanged
    fn report<T>(&self, result: AppResult<T>, success: impl FnOnce(&T) -> String) -> AppResult<T> {
        match &result {
            Ok(value) => self.notifier.success(&success(value)),
            Err(err) => {
                tracing::debug!(code = %err.code, error = %err.message, "Operation rejected");
                self.notifier.error(&err.message);
            }
        }
        result
    }

    // ========== Queries ==========

    pub fn document(&self) -> AppState {
        self.store.load_document()
    }

    pub fn findings(&self) -> Vec<Finding> {
        finding::find_all(&self.store)
    }

    pub fn capas(&self) -> Vec<Capa> {
        capa::find_all(&self.store)
    }

    /// Findings that can still receive a CAPA
    pub fn unlinked_findings(&self) -> Vec<Finding> {
        finding::find_unlinked(&self.store)
    }

    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary::from_state(&self.store.load_document())
    }

    // ========== Findings ==========

    /// Quick add
    pub fn add_finding(&self, data: FindingCreate) -> AppResult<AppState> {
        self.add_findings(vec![data])
    }

    /// Add several findings in one write; any invalid payload rejects all
    pub fn add_findings(&self, payloads: Vec<FindingCreate>) -> AppResult<AppState> {
        let count = payloads.len();
        let result = payloads
            .iter()
            .try_for_each(validation::validate_finding_create)
            .and_then(|()| self.insert_findings(payloads));
        self.report(result, |_| added_message(count))
    }

    fn insert_findings(&self, payloads: Vec<FindingCreate>) -> AppResult<AppState> {
        if payloads.is_empty() {
            return Err(AppError::validation("No findings to add."));
        }
        let now = self.store.clock().now_iso();
        let findings = payloads
            .into_iter()
            .map(|data| Finding::new(self.ids.next_id(), data, &now))
            .collect();
        finding::add(&self.store, findings)
    }

    pub fn update_finding(&self, id: &str, data: FindingUpdate) -> AppResult<AppState> {
        let result = validation::validate_finding_update(&data)
            .and_then(|()| finding::update(&self.store, id, &data));
        self.report(result, |_| "Finding updated.".to_string())
    }

    pub fn toggle_finding_status(&self, id: &str) -> AppResult<AppState> {
        let result = finding::toggle_status(&self.store, id);
        self.report(result, |doc| {
            let status = doc.finding(id).map(|f| f.status.as_str()).unwrap_or_default();
            format!("Finding marked {status}.")
        })
    }

    /// Delete a finding; its CAPA, if any, is kept
    pub fn delete_finding(&self, id: &str) -> AppResult<AppState> {
        let result = finding::delete(&self.store, id);
        self.report(result, |_| "Finding deleted.".to_string())
    }

    // ========== Bulk import ==========

    /// One finding per non-blank line
    pub fn import_lines(
        &self,
        text: &str,
        severity: Severity,
        category: Category,
    ) -> AppResult<AppState> {
        let rows = import::parse_lines(text, severity, category);
        if rows.is_empty() {
            return self.report(
                Err(AppError::required("text", "Paste one finding per line.")),
                |_| String::new(),
            );
        }
        self.add_findings(rows)
    }

    /// One finding per usable CSV row, persisted in a single write
    pub fn import_csv_reader<R: Read>(&self, reader: R) -> AppResult<AppState> {
        let result = import::parse_csv(reader).and_then(|batch| {
            let mut skipped = batch.skipped;
            let rows: Vec<FindingCreate> = batch
                .rows
                .into_iter()
                .filter(|row| match validation::validate_finding_create(row) {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!(title = %row.title, error = %e, "Dropping invalid CSV row");
                        skipped += 1;
                        false
                    }
                })
                .collect();

            if rows.is_empty() {
                return Err(AppError::import_empty("CSV appears empty."));
            }
            if skipped > 0 {
                tracing::info!(skipped, "CSV rows skipped");
            }
            let count = rows.len();
            self.insert_findings(rows).map(|doc| (doc, count))
        });

        self.report(result, |(_, count)| added_message(*count))
            .map(|(doc, _)| doc)
    }

    pub fn import_csv_file(&self, path: impl AsRef<Path>) -> AppResult<AppState> {
        let path = path.as_ref();
        match File::open(path) {
            Ok(file) => self.import_csv_reader(BufReader::new(file)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "CSV file unreadable");
                let err = AppError::import_parse("Failed to parse CSV.")
                    .with_detail("path", path.display().to_string());
                self.report(Err(err), |_| String::new())
            }
        }
    }

    // ========== CAPAs ==========

    /// Create a CAPA and link it to its finding
    pub fn create_capa(&self, data: CapaCreate) -> AppResult<AppState> {
        let result = validation::validate_capa_create(&data)
            .and_then(|()| date_input_to_timestamp(&data.due_date))
            .and_then(|due_date| {
                let now = self.store.clock().now_iso();
                let built = capa::build_capa(self.ids.next_id(), data, due_date, &now);
                capa::create(&self.store, built)
            });
        self.report(result, |_| "CAPA created and linked.".to_string())
    }

    pub fn update_capa(&self, id: &str, data: CapaUpdate) -> AppResult<AppState> {
        let result = validation::validate_capa_update(&data)
            .and_then(|()| {
                data.due_date
                    .as_deref()
                    .map(date_input_to_timestamp)
                    .transpose()
            })
            .and_then(|due_date| capa::update(&self.store, id, &data, due_date));
        self.report(result, |_| "CAPA updated.".to_string())
    }

    /// Delete a CAPA and clear its finding's link
    pub fn delete_capa(&self, id: &str) -> AppResult<AppState> {
        let result = capa::delete(&self.store, id);
        self.report(result, |_| "CAPA deleted.".to_string())
    }
}
