use std::path::Path;

use rust_xlsxwriter::Workbook;

use crate::error::Result;
use crate::model::CellValue;
use crate::report::WorkbookData;

/// Writes the provided workbook data to the given path. Numeric cells stay
/// numeric so the sheets can be summed in Excel.
pub fn write_workbook(path: &Path, workbook: &WorkbookData) -> Result<()> {
    let mut workbook_writer = Workbook::new();

    for sheet in &workbook.tables {
        let table = &sheet.table;
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&sheet.sheet_name)?;

        for (col_idx, header) in table.columns.iter().enumerate() {
            worksheet.write_string(0, col_idx as u16, header)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            let excel_row = (row_idx + 1) as u32;
            for (col_idx, cell) in row.iter().enumerate() {
                let excel_col = col_idx as u16;
                match cell {
                    CellValue::Empty => {}
                    CellValue::Text(value) => {
                        worksheet.write_string(excel_row, excel_col, value)?;
                    }
                    CellValue::Number(value) => {
                        worksheet.write_number(excel_row, excel_col, *value)?;
                    }
                    CellValue::Bool(value) => {
                        worksheet.write_boolean(excel_row, excel_col, *value)?;
                    }
                }
            }
        }

        if !table.columns.is_empty() {
            let col_end = (table.columns.len() as u16).saturating_sub(1);
            worksheet.autofilter(0, 0, table.rows.len() as u32, col_end)?;
        }
    }

    workbook_writer.save(path)?;
    Ok(())
}
