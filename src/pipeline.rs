//! Analysis of one contact file against the shared call log and lookup.
//!
//! [`process_contact_file`] holds no state between calls, so contact files
//! can be processed in any order, or in parallel, with identical results.

use serde::Serialize;
use tracing::debug;

use crate::classify::collapse_by_service;
use crate::layout::{DEFAULT_ID_COLUMN, LayoutMatch, detect_contact_phones};
use crate::model::Table;
use crate::reconcile::{CallLog, OccurrenceLookup, reconcile};
use crate::report::{
    DETAIL_SHEET, PER_PHONE_SHEET, PIVOT_SHEET, PhoneSummary, ServicePivot, SheetTable,
    WorkbookData, detail_table, phone_summary_table, pivot_by_service, summarize_phones,
};

/// Knobs for a single analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Contact column holding the unique key.
    pub id_column: String,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            id_column: DEFAULT_ID_COLUMN.to_string(),
        }
    }
}

/// Non-fatal findings of one analysis.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Diagnostics {
    /// Occurrence codes of matched calls missing from the lookup.
    pub unmatched_codes: Vec<String>,
    pub matched_layouts: Vec<LayoutMatch>,
    /// Distinct `(identifier, phone)` pairs found in the contact file.
    pub contact_phones: usize,
    /// Joined records, one per matched call and contact.
    pub matched_calls: usize,
    pub unparseable_calls: usize,
}

/// Contact file none of the known layouts applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnrecognizedLayout {
    pub columns: Vec<String>,
}

/// Tables and diagnostics produced for one contact file.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub detail: Table,
    pub per_phone: Vec<PhoneSummary>,
    pub pivot: ServicePivot,
    pub diagnostics: Diagnostics,
}

impl Analysis {
    /// Lays the three report tables out as workbook sheets.
    pub fn workbook(&self) -> WorkbookData {
        WorkbookData {
            tables: vec![
                SheetTable {
                    sheet_name: DETAIL_SHEET.to_string(),
                    table: self.detail.clone(),
                },
                SheetTable {
                    sheet_name: PER_PHONE_SHEET.to_string(),
                    table: phone_summary_table(&self.per_phone),
                },
                SheetTable {
                    sheet_name: PIVOT_SHEET.to_string(),
                    table: self.pivot.to_table(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Unrecognized(UnrecognizedLayout),
    Analyzed(Analysis),
}

/// Runs detection, reconciliation, classification and aggregation for one
/// contact table.
pub fn process_contact_file(
    calls: &CallLog,
    contacts: &Table,
    lookup: &OccurrenceLookup,
    options: &AnalysisOptions,
) -> FileOutcome {
    let detection = detect_contact_phones(contacts, &options.id_column);
    if !detection.is_recognized() {
        return FileOutcome::Unrecognized(UnrecognizedLayout {
            columns: contacts.columns.clone(),
        });
    }
    debug!(
        layouts = detection.matches.len(),
        contact_phones = detection.phones.len(),
        "contact layout detected"
    );

    let reconciliation = reconcile(calls, &detection.phones, lookup);
    let outcomes = collapse_by_service(&reconciliation.records);
    debug!(
        records = reconciliation.records.len(),
        service_phones = outcomes.len(),
        "calls reconciled"
    );

    let diagnostics = Diagnostics {
        unmatched_codes: reconciliation.unmatched_codes.clone(),
        matched_layouts: detection.matches,
        contact_phones: detection.phones.len(),
        matched_calls: reconciliation.records.len(),
        unparseable_calls: reconciliation.unparseable_calls,
    };

    FileOutcome::Analyzed(Analysis {
        detail: detail_table(calls, lookup, &reconciliation.records, &options.id_column),
        per_phone: summarize_phones(&reconciliation.records),
        pivot: pivot_by_service(&outcomes),
        diagnostics,
    })
}
