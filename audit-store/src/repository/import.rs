//! Bulk import parsing
//!
//! Turns pasted text or a CSV file into finding payloads. Parsing never
//! touches the store; the caller persists the whole batch in one update.
//!
//! | Column | Required | Fallback |
//! |--------|----------|----------|
//! | title | yes | row dropped when empty |
//! | comarRef | no | `""` |
//! | severity | no | `Minor` (also for unknown values) |
//! | notes | no | `""` |
//! | pageRef | no | `""` |
//! | category | no | `Other` (also for unknown values) |
//!
//! Header names are case-sensitive; unknown columns are ignored.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};
use shared::error::{AppError, AppResult};
use shared::models::{Category, FindingCreate, Severity};

/// Parsed import batch
#[derive(Debug, Clone, Default)]
pub struct ImportBatch {
    pub rows: Vec<FindingCreate>,
    /// Records dropped as malformed or untitled
    pub skipped: usize,
}

impl ImportBatch {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One payload per non-blank line, trimmed, with the caller's defaults
pub fn parse_lines(text: &str, severity: Severity, category: Category) -> Vec<FindingCreate> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| FindingCreate::titled(line, severity, category))
        .collect()
}

/// Column positions resolved from the header row
#[derive(Debug, Default)]
struct Columns {
    title: Option<usize>,
    comar_ref: Option<usize>,
    severity: Option<usize>,
    notes: Option<usize>,
    page_ref: Option<usize>,
    category: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let find = |name: &str| headers.iter().position(|h| h == name);
        Self {
            title: find("title"),
            comar_ref: find("comarRef"),
            severity: find("severity"),
            notes: find("notes"),
            page_ref: find("pageRef"),
            category: find("category"),
        }
    }

    fn row(&self, record: &StringRecord) -> FindingCreate {
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .unwrap_or_default()
                .trim()
                .to_string()
        };
        FindingCreate {
            title: cell(self.title),
            comar_ref: cell(self.comar_ref),
            severity: Severity::coerce(&cell(self.severity)),
            notes: cell(self.notes),
            page_ref: cell(self.page_ref),
            category: Category::coerce(&cell(self.category)),
        }
    }
}

/// Parse a CSV document with a header row
///
/// Fails only when the input cannot be read as CSV at all. Individual bad
/// records are counted in [`ImportBatch::skipped`] and dropped.
pub fn parse_csv<R: Read>(reader: R) -> AppResult<ImportBatch> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(|e| {
        tracing::warn!(error = %e, "CSV header unreadable");
        AppError::import_parse("Failed to parse CSV.")
    })?;
    let columns = Columns::from_headers(headers);

    let mut batch = ImportBatch::default();
    for (line, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(row = line + 1, error = %e, "Skipping malformed CSV record");
                batch.skipped += 1;
                continue;
            }
        };

        let row = columns.row(&record);
        if row.title.is_empty() {
            batch.skipped += 1;
            continue;
        }
        batch.rows.push(row);
    }

    tracing::debug!(rows = batch.rows.len(), skipped = batch.skipped, "CSV parsed");
    Ok(batch)
}
