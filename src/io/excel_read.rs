use std::path::Path;

use calamine::{DataType, Reader, open_workbook_auto};

use crate::error::{Result, ToolError};
use crate::model::{CellValue, Table};

/// Reads the first worksheet of an `.xlsx`/`.xls`/`.ods` workbook. The first
/// row is the header; column names come back trimmed and lower-cased. Fully
/// blank rows are skipped.
pub fn read_first_sheet(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range_at(0).ok_or_else(|| {
        ToolError::InvalidWorkbook(format!("{} has no worksheet", path.display()))
    })??;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };

    let mut table = Table::new(header.iter().map(|cell| cell_to_value(cell).as_text()));
    for row in rows {
        let cells: Vec<CellValue> = row.iter().map(cell_to_value).collect();
        if cells.iter().all(CellValue::is_empty) {
            continue;
        }
        table.push_row(cells);
    }
    table.normalize_headers();
    Ok(table)
}

fn cell_to_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::String(value) => CellValue::text(value.clone()),
        DataType::Float(value) => CellValue::Number(*value),
        DataType::Int(value) => CellValue::Number(*value as f64),
        DataType::Bool(value) => CellValue::Bool(*value),
        DataType::Empty => CellValue::Empty,
        other => CellValue::text(other.to_string()),
    }
}
