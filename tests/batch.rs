use std::fs;
use std::path::Path;

use calamine::{DataType, Reader, open_workbook_auto};
use callrecon::ToolError;
use callrecon::batch::{BatchConfig, FileStatus, run_batch};
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

fn write_sheet(path: &Path, header: &[&str], rows: &[Vec<SheetCell>]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (col, name) in header.iter().enumerate() {
        worksheet.write_string(0, col as u16, *name).expect("header written");
    }
    for (row_idx, row) in rows.iter().enumerate() {
        for (col, cell) in row.iter().enumerate() {
            let (row_idx, col) = ((row_idx + 1) as u32, col as u16);
            match cell {
                SheetCell::Text(value) => {
                    worksheet.write_string(row_idx, col, *value).expect("cell written");
                }
                SheetCell::Number(value) => {
                    worksheet.write_number(row_idx, col, *value).expect("cell written");
                }
            }
        }
    }
    workbook.save(path).expect("workbook saved");
}

enum SheetCell {
    Text(&'static str),
    Number(f64),
}

use SheetCell::{Number, Text};

struct Fixture {
    _root: tempfile::TempDir,
    config: BatchConfig,
}

fn fixture() -> Fixture {
    let root = tempdir().expect("temporary directory");
    let calls_dir = root.path().join("chamadas");
    let lookup_dir = root.path().join("de_para");
    let contacts_dir = root.path().join("telefones");
    let output_dir = root.path().join("saida");
    for dir in [&calls_dir, &lookup_dir, &contacts_dir] {
        fs::create_dir_all(dir).expect("directory created");
    }

    write_sheet(
        &calls_dir.join("chamadas.xlsx"),
        &["Número", "Acionamento", "Serviço", "Duração"],
        &[
            vec![Number(5511999990000.0), Text("PROMESSA"), Text("Honda"), Number(120.0)],
            vec![Text("(11) 99999-0000"), Text("ALO"), Text("Honda"), Number(30.0)],
            vec![Text("21988887777"), Text("CAIXA POSTAL"), Text("Honda"), Number(5.0)],
            vec![Text("31977776666"), Text("ALO"), Text("Varejo"), Number(40.0)],
            vec![Text("41966665555"), Text("ALO"), Text("Varejo"), Number(40.0)],
        ],
    );
    write_sheet(
        &lookup_dir.join("de_para.xlsx"),
        &["Ocorrência", "Tentativa", "Alo", "CPC", "Promessa"],
        &[
            vec![Text("PROMESSA"), Number(1.0), Number(1.0), Number(1.0), Number(1.0)],
            vec![Text("ALO"), Number(1.0), Number(1.0), Number(0.0), Number(0.0)],
        ],
    );

    fs::write(
        contacts_dir.join("base_a.csv"),
        "CPF;DDD01;TELEFONE01;DDD02;TELEFONE02\n\
         111;11;999990000;21;988887777\n\
         222;31;977776666;;\n",
    )
    .expect("contacts written");
    fs::write(contacts_dir.join("base_b.csv"), "nome;email\nAna;ana@example.com\n")
        .expect("contacts written");

    let config = BatchConfig::new(calls_dir, lookup_dir, contacts_dir, output_dir);
    Fixture {
        _root: root,
        config,
    }
}

fn text(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        _ => String::new(),
    }
}

#[test]
fn batch_writes_reports_and_skips_unknown_layouts() {
    let fixture = fixture();

    let summary = run_batch(&fixture.config).expect("batch completes");

    assert_eq!(summary.files.len(), 2);
    assert_eq!(summary.written(), 1);
    assert_eq!(summary.skipped(), 1);
    assert_eq!(summary.failed(), 0);

    let first = &summary.files[0];
    let FileStatus::Written { output } = &first.status else {
        panic!("base_a should be written, got {:?}", first.status);
    };
    assert!(output.ends_with("ANALISE_base_a.xlsx"));
    let diagnostics = first.diagnostics.as_ref().expect("diagnostics attached");
    assert_eq!(diagnostics.unmatched_codes, ["CAIXA POSTAL"]);
    assert_eq!(diagnostics.contact_phones, 3);
    assert_eq!(diagnostics.matched_calls, 4);

    assert!(matches!(
        &summary.files[1].status,
        FileStatus::Skipped { columns } if columns == &["nome", "email"]
    ));

    let mut workbook = open_workbook_auto(output).expect("report opens");
    let names = workbook.sheet_names().to_vec();
    assert_eq!(names, ["DETALHE", "POR_TELEFONE", "RESUMO_PIVOT"]);

    let detail = workbook
        .worksheet_range("DETALHE")
        .expect("detail sheet")
        .expect("detail readable");
    assert_eq!(detail.rows().count(), 5);

    let per_phone = workbook
        .worksheet_range("POR_TELEFONE")
        .expect("per-phone sheet")
        .expect("per-phone readable");
    let rows: Vec<_> = per_phone.rows().skip(1).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(text(rows[0].first()), "11999990000");
    assert_eq!(text(rows[0].get(1)), "2");
    assert_eq!(text(rows[0].get(5)), "1");

    let pivot = workbook
        .worksheet_range("RESUMO_PIVOT")
        .expect("pivot sheet")
        .expect("pivot readable");
    let rows: Vec<Vec<String>> = pivot
        .rows()
        .map(|row| row.iter().map(|cell| text(Some(cell))).collect())
        .collect();
    assert_eq!(
        rows,
        [
            vec!["serviço", "qtd_telefones", "alo", "cpc", "promessa"],
            vec!["Honda", "2", "0", "0", "1"],
            vec!["Varejo", "1", "1", "0", "0"],
            vec!["TOTAL GERAL", "3", "1", "0", "1"],
        ]
    );
}

#[test]
fn summary_is_written_as_json() {
    let fixture = fixture();
    let summary = run_batch(&fixture.config).expect("batch completes");
    let path = fixture.config.output_dir.join("resumo.json");

    summary.write_json(&path).expect("summary written");

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("summary read")).expect("JSON");
    assert_eq!(json["files"][0]["status"], "written");
    assert_eq!(json["files"][1]["status"], "skipped");
    assert_eq!(json["files"][0]["diagnostics"]["unmatched_codes"][0], "CAIXA POSTAL");
}

#[test]
fn failed_contact_file_does_not_stop_the_batch() {
    let fixture = fixture();
    // A directory named like the output of base_a makes that write fail.
    fs::create_dir_all(fixture.config.output_dir.join("ANALISE_base_a.xlsx"))
        .expect("blocking directory created");

    let summary = run_batch(&fixture.config).expect("batch completes");

    assert_eq!(summary.files.len(), 2);
    assert!(matches!(summary.files[0].status, FileStatus::Failed { .. }));
    assert!(summary.files[0].diagnostics.is_none());
    assert!(matches!(summary.files[1].status, FileStatus::Skipped { .. }));
}

#[test]
fn missing_lookup_workbook_aborts_the_batch() {
    let fixture = fixture();
    fs::remove_file(fixture.config.lookup_dir.join("de_para.xlsx")).expect("lookup removed");

    let error = run_batch(&fixture.config).expect_err("no lookup available");

    assert!(matches!(error, ToolError::NoMatchingFiles { .. }));
}
