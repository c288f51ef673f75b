//! Two-phase file import.
//!
//! *Reading* parses the whole file into plain records; *Applying* maps
//! header-name variants onto the canonical schema and appends to the target
//! collection. The two phases make imports all-or-nothing: a file that fails
//! to parse writes no records and no audit entry.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::{PharmacyError, Result};
use crate::metrics::MetricsCollector;
use crate::models::{IdGenerator, ImportTarget, Pharmacy, UploadRecord, WellnessProgram};
use crate::repository::{Collection, UploadLog};
use crate::store::Store;
use crate::validation::InputValidator;

/// One raw record produced by the Reading phase.
type RawRecord = Map<String, Value>;

/// Summary of a completed import.
#[derive(Debug, Clone)]
pub struct ImportReport {
    /// Parsed target collection
    pub target: ImportTarget,
    /// Name of the imported file
    pub file_name: String,
    /// Records appended to the target collection
    pub records_applied: usize,
    /// The audit entry written for this import
    pub audit: UploadRecord,
}

/// File importer over the store.
///
/// Imports are serialized with a busy flag: a second import started while
/// one is being applied fails fast instead of interleaving writes.
#[derive(Debug, Clone)]
pub struct Importer {
    store: Store,
    upload_log: UploadLog,
    metrics: MetricsCollector,
    busy: Arc<AtomicBool>,
}

impl Importer {
    /// Bind to the store.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            upload_log: UploadLog::new(store.clone()),
            store,
            metrics: MetricsCollector::default(),
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Import `path` into the collection declared by `declared_type`.
    ///
    /// The declared type is recorded in the audit entry as-is; an
    /// unrecognized type applies zero records but still completes.
    pub fn import(&self, path: &Path, declared_type: &str) -> Result<ImportReport> {
        InputValidator::validate_import_path(path)
            .map_err(|err| PharmacyError::Validation(err.to_string()))?;

        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(PharmacyError::ImportInProgress);
        }
        let outcome = self.import_inner(path, declared_type);
        self.busy.store(false, Ordering::SeqCst);

        if let Err(err) = &outcome {
            warn!(%err, file = %path.display(), "import aborted, nothing was written");
            self.metrics.record_import_failure(declared_type);
        }
        outcome
    }

    fn import_inner(&self, path: &Path, declared_type: &str) -> Result<ImportReport> {
        let started = Instant::now();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let target: ImportTarget = declared_type.parse().unwrap_or(ImportTarget::Unrecognized);

        // Reading
        let records = read_records(path)?;

        // Applying
        let applied = match target {
            ImportTarget::Pharmacies => self.apply_pharmacies(&records)?,
            ImportTarget::Wellness => self.apply_wellness(&records)?,
            ImportTarget::Unrecognized => {
                warn!(declared_type, "unrecognized import target, applying no records");
                0
            }
        };

        let audit = self.upload_log.record(&file_name, declared_type, applied)?;
        self.metrics
            .record_import(applied, started.elapsed(), declared_type);
        info!(file = %file_name, declared_type, applied, "import complete");

        Ok(ImportReport {
            target,
            file_name,
            records_applied: applied,
            audit,
        })
    }

    fn apply_pharmacies(&self, records: &[RawRecord]) -> Result<usize> {
        let collection: Collection<Pharmacy> = Collection::new(self.store.clone());
        let now = Local::now();
        let mut all = collection.list();
        for record in records {
            all.push(Pharmacy {
                id: IdGenerator::next("ph"),
                name: text_field(record, &["name", "Name"]),
                address: text_field(record, &["address", "Address"]),
                phone: text_field(record, &["phone", "Phone"]),
                email: text_field(record, &["email", "Email"]),
                license: text_field(record, &["license", "License"]),
                created_at: now,
            });
        }
        collection.save(&all)?;
        Ok(records.len())
    }

    fn apply_wellness(&self, records: &[RawRecord]) -> Result<usize> {
        let collection: Collection<WellnessProgram> = Collection::new(self.store.clone());
        let now = Local::now();
        let today = now.date_naive();
        let mut all = collection.list();
        for record in records {
            let start_date = date_field(record, &["startDate", "Start Date"], today);
            let end_date = date_field(record, &["endDate", "End Date"], today);
            InputValidator::validate_program_dates(start_date, end_date)
                .map_err(|err| PharmacyError::Import(err.to_string()))?;
            all.push(WellnessProgram {
                id: IdGenerator::next("wp"),
                name: text_field(record, &["name", "Name"]),
                description: text_field(record, &["description", "Description"]),
                start_date,
                end_date,
                price: number_field(record, &["price", "Price"]),
                created_at: now,
            });
        }
        collection.save(&all)?;
        Ok(records.len())
    }
}

/// Reading phase: select the parser by file extension.
///
/// `.json` expects an array of objects; every other extension is read as
/// delimited text with a header row. A file with no extension at all is
/// rejected.
fn read_records(path: &Path) -> Result<Vec<RawRecord>> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase());
    match extension.as_deref() {
        Some("json") => read_json(path),
        Some(_) => read_delimited(path),
        None => Err(PharmacyError::UnsupportedFormat(
            path.display().to_string(),
        )),
    }
}

fn read_json(path: &Path) -> Result<Vec<RawRecord>> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    let Value::Array(items) = value else {
        return Err(PharmacyError::Import(
            "expected a JSON array of records".to_string(),
        ));
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(record) => Ok(record),
            other => Err(PharmacyError::Import(format!(
                "expected a JSON object per record, found {other}"
            ))),
        })
        .collect()
}

/// Delimited-text parser: the first row names the fields, each following
/// row is zipped positionally against the header. Ragged rows pad missing
/// trailing fields with the empty string.
fn read_delimited(path: &Path) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let mut record = RawRecord::new();
        for (index, header) in headers.iter().enumerate() {
            let value = row.get(index).unwrap_or("");
            record.insert(header.clone(), Value::String(value.to_string()));
        }
        records.push(record);
    }
    Ok(records)
}

fn field<'a>(record: &'a RawRecord, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| record.get(*name))
}

/// First matching field as text; missing fields become the empty string.
fn text_field(record: &RawRecord, names: &[&str]) -> String {
    match field(record, names) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// First matching field as a number, with safe fallback to 0 when the
/// value is missing or unparseable.
fn number_field(record: &RawRecord, names: &[&str]) -> f64 {
    match field(record, names) {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(Value::String(text)) => text.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// First matching field as a calendar date, falling back to `default` when
/// missing or unparseable.
fn date_field(record: &RawRecord, names: &[&str], default: NaiveDate) -> NaiveDate {
    match field(record, names) {
        Some(Value::String(text)) => {
            NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").unwrap_or(default)
        }
        _ => default,
    }
}
