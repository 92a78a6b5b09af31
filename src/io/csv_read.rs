use std::path::Path;

use csv::ReaderBuilder;

use crate::error::Result;
use crate::model::{CellValue, Table};

/// Delimiter used by the contact exports.
pub const DEFAULT_DELIMITER: u8 = b';';

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Reads a delimited contact file. Every cell is text; ragged rows are padded
/// to the header width. Fields that are not valid UTF-8 are decoded as
/// Latin-1, which is what spreadsheet tools emit for these exports.
pub fn read_delimited(path: &Path, delimiter: u8) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .quote(b'"')
        .flexible(true)
        .from_path(path)?;

    let headers = reader.byte_headers()?.clone();
    let mut table = Table::new(headers.iter().enumerate().map(|(idx, field)| {
        let name = decode_field(field);
        if idx == 0 {
            name.trim_start_matches(BYTE_ORDER_MARK).to_string()
        } else {
            name
        }
    }));

    for record in reader.byte_records() {
        let record = record?;
        table.push_row(
            record
                .iter()
                .map(|field| CellValue::text(decode_field(field)))
                .collect(),
        );
    }
    table.normalize_headers();
    Ok(table)
}

fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&byte| char::from(byte)).collect(),
    }
}
