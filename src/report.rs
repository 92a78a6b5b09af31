use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;

use crate::classify::{OutcomeLabel, ServicePhoneOutcome};
use crate::model::{CellValue, Table};
use crate::reconcile::{CallLog, OccurrenceLookup, ReconciledRecord};

/// Sheet holding the joined call records.
pub const DETAIL_SHEET: &str = "DETALHE";
/// Sheet holding one row per phone.
pub const PER_PHONE_SHEET: &str = "POR_TELEFONE";
/// Sheet holding the per-service pivot.
pub const PIVOT_SHEET: &str = "RESUMO_PIVOT";

/// Label of the synthetic row closing the pivot.
pub const GRAND_TOTAL_LABEL: &str = "TOTAL GERAL";

pub const NORMALIZED_PHONE_COLUMN: &str = "numero_norm";
/// Suffix for a lookup column whose name is already taken.
const LOOKUP_COLLISION_SUFFIX: &str = "_de_para";
/// Suffix for the contact identifier when the call log already uses its name.
const CONTACT_COLLISION_SUFFIX: &str = "_contato";

/// Outcome columns kept in the projected pivot, in report order.
pub const PIVOT_LABELS: [OutcomeLabel; 3] = [
    OutcomeLabel::Answered,
    OutcomeLabel::RightPartyContact,
    OutcomeLabel::Promise,
];

/// A table that will be materialised as an Excel sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub table: Table,
}

/// All tables of one output workbook, in sheet order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkbookData {
    pub tables: Vec<SheetTable>,
}

/// Builds the detail sheet: every call-log column, then the normalised phone
/// and contact identifier, then every lookup column (blank when the
/// occurrence code is unmapped).
///
/// A name already taken gets `_contato` for the contact columns and
/// `_de_para` for lookup columns.
pub fn detail_table(
    calls: &CallLog,
    lookup: &OccurrenceLookup,
    records: &[ReconciledRecord],
    id_column: &str,
) -> Table {
    let call_table = calls.table();
    let lookup_table = lookup.table();

    let mut columns = call_table.columns.clone();
    let mut taken: HashSet<String> = columns.iter().cloned().collect();
    let appended = [
        (NORMALIZED_PHONE_COLUMN, CONTACT_COLLISION_SUFFIX),
        (id_column, CONTACT_COLLISION_SUFFIX),
    ]
    .into_iter()
    .chain(
        lookup_table
            .columns
            .iter()
            .map(|name| (name.as_str(), LOOKUP_COLLISION_SUFFIX)),
    );
    for (name, suffix) in appended {
        let name = unique_column(name, suffix, &taken);
        taken.insert(name.clone());
        columns.push(name);
    }

    let mut table = Table::new(columns);
    for record in records {
        let mut row = Vec::with_capacity(table.width());
        row.extend((0..call_table.width()).map(|col| call_table.cell(record.call_row, col).clone()));
        row.push(CellValue::text(record.phone.as_str()));
        row.push(CellValue::text(record.contact_id.as_str()));
        row.extend((0..lookup_table.width()).map(|col| match record.lookup_row {
            Some(lookup_row) => lookup_table.cell(lookup_row, col).clone(),
            None => CellValue::Empty,
        }));
        table.push_row(row);
    }
    table
}

fn unique_column(name: &str, suffix: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(name) {
        return name.to_string();
    }
    let mut candidate = format!("{name}{suffix}");
    let mut counter = 2;
    while taken.contains(&candidate) {
        candidate = format!("{name}{suffix}_{counter}");
        counter += 1;
    }
    candidate
}

/// Call volume and summed outcome flags of one phone across services.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PhoneSummary {
    pub phone: String,
    pub calls: usize,
    pub attempts: f64,
    pub answered: f64,
    pub cpc: f64,
    pub promises: f64,
}

/// Groups reconciled records by phone. Flags are summed rather than OR-ed so
/// the volume of each outcome stays visible; absent flags add nothing.
pub fn summarize_phones(records: &[ReconciledRecord]) -> Vec<PhoneSummary> {
    let mut grouped: BTreeMap<&str, PhoneSummary> = BTreeMap::new();
    for record in records {
        let summary = grouped
            .entry(record.phone.as_str())
            .or_insert_with(|| PhoneSummary {
                phone: record.phone.clone(),
                ..PhoneSummary::default()
            });
        summary.calls += 1;
        if let Some(flags) = record.flags {
            summary.attempts += flags.attempt.unwrap_or(0.0);
            summary.answered += flags.answered.unwrap_or(0.0);
            summary.cpc += flags.cpc.unwrap_or(0.0);
            summary.promises += flags.promise.unwrap_or(0.0);
        }
    }
    grouped.into_values().collect()
}

pub fn phone_summary_table(summaries: &[PhoneSummary]) -> Table {
    let mut table = Table::new([
        NORMALIZED_PHONE_COLUMN,
        "total_chamadas",
        "tentativas",
        "alo",
        "cpc",
        "promessa",
    ]);
    for summary in summaries {
        table.push_row(vec![
            CellValue::text(summary.phone.as_str()),
            summary.calls.into(),
            summary.attempts.into(),
            summary.answered.into(),
            summary.cpc.into(),
            summary.promises.into(),
        ]);
    }
    table
}

/// Distinct phones of one service, split by classified outcome.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ServicePivotRow {
    pub service: String,
    pub phones: usize,
    /// Every label, including the ones the projected report leaves out.
    pub by_label: BTreeMap<OutcomeLabel, usize>,
}

impl ServicePivotRow {
    pub fn count(&self, label: OutcomeLabel) -> usize {
        self.by_label.get(&label).copied().unwrap_or(0)
    }
}

/// Per-service pivot plus its grand total.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ServicePivot {
    pub rows: Vec<ServicePivotRow>,
    pub total: ServicePivotRow,
}

/// Counts distinct phones per service and per label. The total row is the
/// column-wise sum of the service rows, so a phone reached in two services
/// counts twice there.
pub fn pivot_by_service(outcomes: &[ServicePhoneOutcome]) -> ServicePivot {
    let mut cells: BTreeMap<&str, BTreeMap<OutcomeLabel, BTreeSet<&str>>> = BTreeMap::new();
    for outcome in outcomes {
        cells
            .entry(outcome.service.as_str())
            .or_default()
            .entry(outcome.label)
            .or_default()
            .insert(outcome.phone.as_str());
    }

    let rows: Vec<ServicePivotRow> = cells
        .into_iter()
        .map(|(service, labels)| {
            let phones = labels
                .values()
                .flatten()
                .collect::<BTreeSet<_>>()
                .len();
            let by_label = OutcomeLabel::ALL
                .iter()
                .map(|label| (*label, labels.get(label).map_or(0, BTreeSet::len)))
                .collect();
            ServicePivotRow {
                service: service.to_string(),
                phones,
                by_label,
            }
        })
        .collect();

    let mut total = ServicePivotRow {
        service: GRAND_TOTAL_LABEL.to_string(),
        phones: 0,
        by_label: OutcomeLabel::ALL.iter().map(|label| (*label, 0)).collect(),
    };
    for row in &rows {
        total.phones += row.phones;
        for (label, count) in &row.by_label {
            *total.by_label.entry(*label).or_insert(0) += count;
        }
    }

    ServicePivot { rows, total }
}

impl ServicePivot {
    /// Projects the pivot onto the report columns: service, distinct phones,
    /// then [`PIVOT_LABELS`]. The total row comes last.
    pub fn to_table(&self) -> Table {
        let mut columns = vec!["serviço".to_string(), "qtd_telefones".to_string()];
        columns.extend(PIVOT_LABELS.iter().map(|label| label.as_str().to_string()));
        let mut table = Table::new(columns);

        for row in self.rows.iter().chain(std::iter::once(&self.total)) {
            let mut cells = vec![CellValue::text(row.service.as_str()), row.phones.into()];
            cells.extend(PIVOT_LABELS.iter().map(|label| row.count(*label).into()));
            table.push_row(cells);
        }
        table
    }
}
