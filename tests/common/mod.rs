#![allow(dead_code)]

use callrecon::model::{CellValue, Table};
use callrecon::reconcile::{CallLog, OccurrenceLookup};

/// Builds a table whose cells are all text.
pub fn text_table(columns: &[&str], rows: &[&[&str]]) -> Table {
    let mut table = Table::new(columns.iter().copied());
    for row in rows {
        table.push_row(row.iter().map(|cell| CellValue::from(*cell)).collect());
    }
    table
}

/// Call log with `número`, `acionamento` and `serviço` columns.
pub fn call_log(rows: &[(&str, &str, &str)]) -> CallLog {
    let mut table = Table::new(["número", "acionamento", "serviço", "duracao"]);
    for (phone, code, service) in rows {
        table.push_row(vec![
            CellValue::from(*phone),
            CellValue::from(*code),
            CellValue::from(*service),
            CellValue::Number(30.0),
        ]);
    }
    CallLog::from_table(table).expect("call log columns present")
}

/// Lookup rows as `(code, tentativa, alo, cpc, promessa)`.
pub fn lookup(rows: &[(&str, f64, f64, f64, f64)]) -> OccurrenceLookup {
    let mut table = Table::new(["ocorrência", "tentativa", "alo", "cpc", "promessa"]);
    for (code, attempt, answered, cpc, promise) in rows {
        table.push_row(vec![
            CellValue::from(*code),
            CellValue::Number(*attempt),
            CellValue::Number(*answered),
            CellValue::Number(*cpc),
            CellValue::Number(*promise),
        ]);
    }
    OccurrenceLookup::from_table(table).expect("lookup key column present")
}
