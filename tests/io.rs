use std::fs::{self, File};
use std::time::{Duration, SystemTime};

use callrecon::ToolError;
use callrecon::io::csv_read::{DEFAULT_DELIMITER, read_delimited};
use callrecon::io::discover::{WORKBOOK_PATTERNS, latest_file, list_files};
use callrecon::io::excel_read::read_first_sheet;
use callrecon::io::excel_write::write_workbook;
use callrecon::model::{CellValue, Table};
use callrecon::report::{SheetTable, WorkbookData};
use tempfile::tempdir;

#[test]
fn contact_csv_headers_are_normalised() {
    let dir = tempdir().expect("temporary directory");
    let path = dir.path().join("contatos.csv");
    fs::write(
        &path,
        "\u{feff} CPF ;DDD01;\"Telefone01\"\n123;11;\"99999;0000\"\n456;21\n",
    )
    .expect("CSV written");

    let table = read_delimited(&path, DEFAULT_DELIMITER).expect("CSV read");

    assert_eq!(table.columns, ["cpf", "ddd01", "telefone01"]);
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows[0][2], CellValue::from("99999;0000"));
    assert_eq!(table.rows[1][2], CellValue::Empty);
}

#[test]
fn latin1_contact_files_are_decoded() {
    let dir = tempdir().expect("temporary directory");
    let path = dir.path().join("latin1.csv");
    // "cpf;número" with ú encoded as the single Latin-1 byte 0xFA.
    let mut bytes = b"cpf;n\xfamero\n".to_vec();
    bytes.extend_from_slice(b"1;11999990000\n");
    fs::write(&path, bytes).expect("CSV written");

    let table = read_delimited(&path, DEFAULT_DELIMITER).expect("CSV read");

    assert_eq!(table.columns, ["cpf", "número"]);
}

#[test]
fn workbook_written_and_read_back() {
    let mut table = Table::new(["Número", "Acionamento", "Duração"]);
    table.push_row(vec![
        CellValue::Number(11999990000.0),
        "X".into(),
        CellValue::Number(42.5),
    ]);
    table.push_row(vec![CellValue::Empty, CellValue::Empty, CellValue::Empty]);
    table.push_row(vec!["(21) 3333-4444".into(), CellValue::Empty, CellValue::Bool(true)]);
    let workbook = WorkbookData {
        tables: vec![SheetTable {
            sheet_name: "Chamadas".to_string(),
            table,
        }],
    };
    let dir = tempdir().expect("temporary directory");
    let path = dir.path().join("chamadas.xlsx");

    write_workbook(&path, &workbook).expect("workbook written");
    let restored = read_first_sheet(&path).expect("workbook read");

    assert_eq!(restored.columns, ["número", "acionamento", "duração"]);
    assert_eq!(restored.len(), 2, "blank rows are skipped");
    assert_eq!(restored.rows[0][0].as_text(), "11999990000");
    assert_eq!(restored.rows[0][2], CellValue::Number(42.5));
    assert_eq!(restored.rows[1][0], CellValue::from("(21) 3333-4444"));
    assert_eq!(restored.rows[1][2], CellValue::Bool(true));
}

#[test]
fn latest_file_picks_the_newest_workbook() {
    let dir = tempdir().expect("temporary directory");
    let old = dir.path().join("janeiro.xlsx");
    let new = dir.path().join("fevereiro.XLSX");
    for path in [&old, &new] {
        fs::write(path, b"placeholder").expect("file written");
    }
    fs::write(dir.path().join("~$fevereiro.xlsx"), b"lock").expect("lock file written");
    fs::write(dir.path().join("notas.txt"), b"ignored").expect("file written");
    File::options()
        .write(true)
        .open(&old)
        .and_then(|file| file.set_modified(SystemTime::now() - Duration::from_secs(3600)))
        .expect("mtime set");

    let files = list_files(dir.path(), &WORKBOOK_PATTERNS).expect("files listed");
    let latest = latest_file(dir.path(), &WORKBOOK_PATTERNS).expect("latest found");

    assert_eq!(files, [new.clone(), old]);
    assert_eq!(latest, new);
}

#[test]
fn empty_directory_reports_no_matching_files() {
    let dir = tempdir().expect("temporary directory");

    let error = list_files(dir.path(), &["*.csv"]).expect_err("nothing to find");

    assert!(matches!(error, ToolError::NoMatchingFiles { .. }));
}
