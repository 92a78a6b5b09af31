//! Joins dialer call attempts to contact phones and to the occurrence
//! ("De x Para") lookup.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::classify::OutcomeFlags;
use crate::error::{Result, ToolError};
use crate::layout::ContactPhone;
use crate::model::Table;
use crate::phone::normalize_phone;

pub const PHONE_COLUMNS: [&str; 2] = ["número", "numero"];
pub const OCCURRENCE_COLUMN: &str = "acionamento";
pub const SERVICE_COLUMNS: [&str; 2] = ["serviço", "servico"];

pub const LOOKUP_KEY_COLUMNS: [&str; 2] = ["ocorrência", "ocorrencia"];
pub const ATTEMPT_COLUMN: &str = "tentativa";
pub const ANSWERED_COLUMN: &str = "alo";
pub const CPC_COLUMN: &str = "cpc";
pub const PROMISE_COLUMN: &str = "promessa";

/// The dialer export, with every phone normalised once up front.
#[derive(Debug, Clone)]
pub struct CallLog {
    table: Table,
    service_idx: usize,
    occurrence_idx: usize,
    phones: Vec<Option<String>>,
}

impl CallLog {
    /// Resolves the phone, occurrence and service columns of a call-log
    /// table. Column names are expected trimmed and lower-cased.
    pub fn from_table(table: Table) -> Result<Self> {
        let phone_idx = table
            .find_column(&PHONE_COLUMNS)
            .ok_or_else(|| ToolError::missing_column("call log", &PHONE_COLUMNS))?;
        let occurrence_idx = table
            .column_index(OCCURRENCE_COLUMN)
            .ok_or_else(|| ToolError::missing_column("call log", &[OCCURRENCE_COLUMN]))?;
        let service_idx = table
            .find_column(&SERVICE_COLUMNS)
            .ok_or_else(|| ToolError::missing_column("call log", &SERVICE_COLUMNS))?;

        let phones = (0..table.len())
            .map(|row| normalize_phone(&table.cell(row, phone_idx).as_text()))
            .collect();

        Ok(Self {
            table,
            service_idx,
            occurrence_idx,
            phones,
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Normalised phone of call `row`, `None` when unparseable.
    pub fn phone(&self, row: usize) -> Option<&str> {
        self.phones.get(row).and_then(|phone| phone.as_deref())
    }

    pub fn occurrence(&self, row: usize) -> String {
        self.table
            .cell(row, self.occurrence_idx)
            .as_text()
            .trim()
            .to_string()
    }

    pub fn service(&self, row: usize) -> String {
        self.table
            .cell(row, self.service_idx)
            .as_text()
            .trim()
            .to_string()
    }
}

/// Occurrence code → outcome flags, one row per code.
#[derive(Debug, Clone)]
pub struct OccurrenceLookup {
    table: Table,
    flag_columns: [Option<usize>; 4],
    index: HashMap<String, usize>,
    duplicates: Vec<String>,
}

impl OccurrenceLookup {
    /// Indexes a lookup table by its occurrence column. A repeated code keeps
    /// its first row; the repeats are listed in [`duplicate_codes`].
    ///
    /// [`duplicate_codes`]: OccurrenceLookup::duplicate_codes
    pub fn from_table(table: Table) -> Result<Self> {
        let key_idx = table
            .find_column(&LOOKUP_KEY_COLUMNS)
            .ok_or_else(|| ToolError::missing_column("occurrence lookup", &LOOKUP_KEY_COLUMNS))?;
        let flag_columns = [ATTEMPT_COLUMN, ANSWERED_COLUMN, CPC_COLUMN, PROMISE_COLUMN]
            .map(|name| table.column_index(name));

        let mut index = HashMap::new();
        let mut duplicates = Vec::new();
        for row in 0..table.len() {
            let code = table.cell(row, key_idx).as_text().trim().to_string();
            if code.is_empty() {
                continue;
            }
            if index.contains_key(&code) {
                if !duplicates.contains(&code) {
                    warn!(%code, "duplicate occurrence code in lookup, keeping first row");
                    duplicates.push(code);
                }
                continue;
            }
            index.insert(code, row);
        }

        Ok(Self {
            table,
            flag_columns,
            index,
            duplicates,
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn duplicate_codes(&self) -> &[String] {
        &self.duplicates
    }

    /// Lookup row index for `code`.
    pub fn row_of(&self, code: &str) -> Option<usize> {
        self.index.get(code).copied()
    }

    pub fn flags(&self, row: usize) -> OutcomeFlags {
        let read = |column: Option<usize>| -> Option<f64> {
            column.and_then(|column| self.table.cell(row, column).as_flag())
        };
        let [attempt, answered, cpc, promise] = self.flag_columns;
        OutcomeFlags {
            attempt: read(attempt),
            answered: read(answered),
            cpc: read(cpc),
            promise: read(promise),
        }
    }
}

/// One call attempt matched to one contact, annotated with its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledRecord {
    /// Row of the call in the call log.
    pub call_row: usize,
    pub contact_id: String,
    pub phone: String,
    pub service: String,
    pub occurrence: String,
    /// Row in the occurrence lookup, `None` when the code is unmapped.
    pub lookup_row: Option<usize>,
    /// Flags from the lookup, `None` when the code is unmapped.
    pub flags: Option<OutcomeFlags>,
}

/// Output of [`reconcile`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub records: Vec<ReconciledRecord>,
    /// Distinct occurrence codes without a lookup row, in first-seen order.
    /// Calls with a blank code are unmapped too but are not listed here.
    pub unmatched_codes: Vec<String>,
    /// Calls whose phone could not be normalised.
    pub unparseable_calls: usize,
}

/// Inner-joins calls with contacts on the normalised phone, then attaches
/// lookup flags by occurrence code, keeping calls whose code is unmapped.
///
/// Output follows call-log order; a call matching several contacts yields
/// one record per contact, in contact order.
pub fn reconcile(
    calls: &CallLog,
    contacts: &[ContactPhone],
    lookup: &OccurrenceLookup,
) -> Reconciliation {
    let mut by_phone: HashMap<&str, Vec<&ContactPhone>> = HashMap::new();
    for contact in contacts {
        by_phone
            .entry(contact.phone.as_str())
            .or_default()
            .push(contact);
    }

    let mut reconciliation = Reconciliation::default();
    let mut seen_unmatched = HashSet::new();

    for row in 0..calls.len() {
        let Some(phone) = calls.phone(row) else {
            reconciliation.unparseable_calls += 1;
            continue;
        };
        let Some(matched) = by_phone.get(phone) else {
            continue;
        };

        let occurrence = calls.occurrence(row);
        let lookup_row = lookup.row_of(&occurrence);
        if lookup_row.is_none()
            && !occurrence.is_empty()
            && seen_unmatched.insert(occurrence.clone())
        {
            reconciliation.unmatched_codes.push(occurrence.clone());
        }
        let flags = lookup_row.map(|lookup_row| lookup.flags(lookup_row));
        let service = calls.service(row);

        for contact in matched {
            reconciliation.records.push(ReconciledRecord {
                call_row: row,
                contact_id: contact.id.clone(),
                phone: phone.to_string(),
                service: service.clone(),
                occurrence: occurrence.clone(),
                lookup_row,
                flags,
            });
        }
    }

    reconciliation
}
