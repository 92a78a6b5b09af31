use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::io::csv_read::{self, DEFAULT_DELIMITER};
use crate::io::discover::{self, CONTACT_PATTERNS, WORKBOOK_PATTERNS};
use crate::io::{excel_read, excel_write};
use crate::pipeline::{AnalysisOptions, Diagnostics, FileOutcome, process_contact_file};
use crate::reconcile::{CallLog, OccurrenceLookup};

/// Prefix of every generated workbook name.
pub const OUTPUT_PREFIX: &str = "ANALISE_";

/// Where a batch reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Directory holding dialer call-log workbooks; the newest one is used.
    pub calls_dir: PathBuf,
    /// Directory holding occurrence lookup workbooks; the newest one is used.
    pub lookup_dir: PathBuf,
    /// Directory holding the contact CSV files, each analysed on its own.
    pub contacts_dir: PathBuf,
    pub output_dir: PathBuf,
    pub delimiter: u8,
    pub options: AnalysisOptions,
}

impl BatchConfig {
    pub fn new(
        calls_dir: impl Into<PathBuf>,
        lookup_dir: impl Into<PathBuf>,
        contacts_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            calls_dir: calls_dir.into(),
            lookup_dir: lookup_dir.into(),
            contacts_dir: contacts_dir.into(),
            output_dir: output_dir.into(),
            delimiter: DEFAULT_DELIMITER,
            options: AnalysisOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Written { output: PathBuf },
    Skipped { columns: Vec<String> },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub contact_file: PathBuf,
    #[serde(flatten)]
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Diagnostics>,
    pub elapsed_ms: u64,
}

/// What a batch did, file by file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub calls_file: PathBuf,
    pub lookup_file: PathBuf,
    pub duplicate_codes: Vec<String>,
    pub files: Vec<FileReport>,
    pub elapsed_ms: u64,
}

impl BatchSummary {
    pub fn written(&self) -> usize {
        self.count(|status| matches!(status, FileStatus::Written { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|status| matches!(status, FileStatus::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, FileStatus::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&FileStatus) -> bool) -> usize {
        self.files
            .iter()
            .filter(|report| predicate(&report.status))
            .count()
    }

    /// Writes the summary as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Analyses every contact file against the newest call log and lookup.
///
/// Failing to locate or load the call log or lookup aborts the batch. Past
/// that point a contact file that cannot be read or written is recorded as
/// failed and the next one is processed.
#[instrument(
    level = "info",
    skip_all,
    fields(contacts_dir = %config.contacts_dir.display(), output_dir = %config.output_dir.display())
)]
pub fn run_batch(config: &BatchConfig) -> Result<BatchSummary> {
    let started = Instant::now();

    let calls_file = discover::latest_file(&config.calls_dir, &WORKBOOK_PATTERNS)?;
    let lookup_file = discover::latest_file(&config.lookup_dir, &WORKBOOK_PATTERNS)?;
    let contact_files = discover::list_files(&config.contacts_dir, &CONTACT_PATTERNS)?;

    let calls = CallLog::from_table(excel_read::read_first_sheet(&calls_file)?)?;
    info!(path = %calls_file.display(), rows = calls.len(), "loaded call log");
    if calls.is_empty() {
        warn!(path = %calls_file.display(), "call log has no rows, every report will be empty");
    }
    let lookup = OccurrenceLookup::from_table(excel_read::read_first_sheet(&lookup_file)?)?;
    info!(path = %lookup_file.display(), rows = lookup.table().len(), "loaded occurrence lookup");

    fs::create_dir_all(&config.output_dir)?;

    let total = contact_files.len();
    let mut files = Vec::with_capacity(total);
    for (index, contact_file) in contact_files.into_iter().enumerate() {
        info!(index = index + 1, total, path = %contact_file.display(), "processing contact file");
        let file_started = Instant::now();
        let (status, diagnostics) = match analyze_file(&contact_file, &calls, &lookup, config) {
            Ok(result) => result,
            Err(error) => {
                warn!(path = %contact_file.display(), %error, "contact file failed, continuing");
                (
                    FileStatus::Failed {
                        error: error.to_string(),
                    },
                    None,
                )
            }
        };
        let elapsed_ms = elapsed_millis(file_started);
        if let FileStatus::Written { output } = &status {
            info!(output = %output.display(), elapsed_ms, "analysis written");
        }
        files.push(FileReport {
            contact_file,
            status,
            diagnostics,
            elapsed_ms,
        });
    }

    let summary = BatchSummary {
        calls_file,
        lookup_file,
        duplicate_codes: lookup.duplicate_codes().to_vec(),
        files,
        elapsed_ms: elapsed_millis(started),
    };
    info!(
        written = summary.written(),
        skipped = summary.skipped(),
        failed = summary.failed(),
        elapsed_ms = summary.elapsed_ms,
        "batch finished"
    );
    Ok(summary)
}

#[instrument(level = "debug", skip(calls, lookup, config), fields(path = %path.display()))]
fn analyze_file(
    path: &Path,
    calls: &CallLog,
    lookup: &OccurrenceLookup,
    config: &BatchConfig,
) -> Result<(FileStatus, Option<Diagnostics>)> {
    let contacts = csv_read::read_delimited(path, config.delimiter)?;
    debug!(columns = ?contacts.columns, rows = contacts.len(), "contact file read");

    let analysis = match process_contact_file(calls, &contacts, lookup, &config.options) {
        FileOutcome::Analyzed(analysis) => analysis,
        FileOutcome::Unrecognized(unrecognized) => {
            warn!(
                columns = ?unrecognized.columns,
                "no known phone layout in contact file, skipping"
            );
            return Ok((
                FileStatus::Skipped {
                    columns: unrecognized.columns,
                },
                None,
            ));
        }
    };

    report_unmatched(&analysis.diagnostics.unmatched_codes);

    let output = output_path(&config.output_dir, path);
    excel_write::write_workbook(&output, &analysis.workbook())?;
    Ok((FileStatus::Written { output }, Some(analysis.diagnostics)))
}

fn report_unmatched(codes: &[String]) {
    if codes.is_empty() {
        info!("every occurrence code found in the lookup");
        return;
    }
    warn!(count = codes.len(), "occurrence codes missing from the lookup");
    for code in codes {
        warn!(%code, "unmatched occurrence code");
    }
}

/// `ANALISE_<contact file stem>.xlsx` inside `output_dir`.
pub fn output_path(output_dir: &Path, contact_file: &Path) -> PathBuf {
    let stem = contact_file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!("{OUTPUT_PREFIX}{stem}.xlsx"))
}

fn elapsed_millis(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
