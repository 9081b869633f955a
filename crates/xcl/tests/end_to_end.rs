//! End-to-end conversions through real codecs

use pretty_assertions::assert_eq;
use std::io::Cursor;
use xcl::prelude::*;
use xcl::LineTerminator;

fn scenario_rows() -> Vec<Vec<CellValue>> {
    vec![
        vec!["A".into(), "B".into(), "C".into()],
        vec!["teste1".into(), 1.1.into(), true.into()],
        vec!["teste2".into(), 2.2.into(), false.into()],
        vec!["teste3".into(), 3.3.into(), true.into()],
    ]
}

/// Build an XLSX workbook in memory from typed rows
fn workbook(rows: Vec<Vec<CellValue>>, sheet: &str) -> Vec<u8> {
    let mut writer =
        XlsxCellWriter::new(Cursor::new(Vec::new()), &XlsxWriteOptions::sheet(sheet)).unwrap();
    run::<_, _, &str>(MemoryProducer::new(rows, Window::all()), &mut writer, &[]).unwrap();
    writer.into_inner().unwrap().into_inner()
}

fn xlsx_to_csv(bytes: Vec<u8>, window: Window, sheet: &str, expressions: &[&str]) -> (String, RunStats) {
    let reader =
        XlsxCellReader::new(Cursor::new(bytes), window, &XlsxReadOptions::sheet(sheet)).unwrap();
    let mut out = Vec::new();
    let writer = CsvCellWriter::new(&mut out, &CsvWriteOptions::default());
    let stats = run(reader, writer, expressions).unwrap();
    (String::from_utf8(out).unwrap(), stats)
}

#[test]
fn test_read_scenario() {
    let window = Window::from_literals("A1", "C4", false);
    let (csv, stats) = xlsx_to_csv(
        workbook(scenario_rows(), "tab1"),
        window,
        "tab1",
        &["$0", "$1 + $1", "$2"],
    );

    let lines: Vec<&str> = csv.split("\r\n").filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.first(), Some(&"A,BB,C"));
    assert_eq!(lines.last(), Some(&"teste3,6.6,true"));
    assert_eq!(lines.len(), 4);
    assert_eq!(stats.cells_read, 12);
    assert_eq!(stats.rows_written, 4);
}

#[test]
fn test_read_scenario_without_header() {
    let window = Window::from_literals("A1", "C4", true);
    let (csv, _) = xlsx_to_csv(workbook(scenario_rows(), "tab1"), window, "tab1", &["$0", "$1 + $1", "$2"]);
    assert_eq!(csv, "teste1,2.2,true\r\nteste2,4.4,false\r\nteste3,6.6,true\r\n");
}

#[test]
fn test_pass_through_reproduces_every_cell() {
    let (csv, stats) = xlsx_to_csv(workbook(scenario_rows(), "data"), Window::all(), "data", &[]);
    assert_eq!(
        csv,
        "A,B,C\r\nteste1,1.1,true\r\nteste2,2.2,false\r\nteste3,3.3,true\r\n"
    );
    assert_eq!(stats.cells_read, stats.cells_written);
}

#[test]
fn test_window_selects_a_block() {
    let (csv, _) = xlsx_to_csv(
        workbook(scenario_rows(), "tab1"),
        Window::from_literals("R2C2", "R3C3", false),
        "tab1",
        &[],
    );
    assert_eq!(csv, "1.1,true\r\n2.2,false\r\n");
}

#[test]
fn test_missing_sheet_yields_nothing() {
    let (csv, stats) = xlsx_to_csv(workbook(scenario_rows(), "tab1"), Window::all(), "other", &["$0"]);
    assert_eq!(csv, "");
    assert_eq!(stats.cells_read, 0);
    assert_eq!(stats.source_missing.as_deref(), Some("other"));
}

#[test]
fn test_division_by_zero_aborts_and_closes_output() {
    let rows = vec![
        vec![CellValue::from(2.0)],
        vec![CellValue::from(0.0)],
        vec![CellValue::from(4.0)],
    ];
    let mut out = Vec::new();
    let options = CsvWriteOptions {
        line_terminator: LineTerminator::LF,
        ..Default::default()
    };
    let writer = CsvCellWriter::new(&mut out, &options);

    let err = run(MemoryProducer::new(rows, Window::all()), writer, &["10 / $0"]).unwrap_err();

    assert!(err.is_evaluation());
    assert!(err.to_string().contains("10 / $0"));
    assert_eq!(String::from_utf8(out).unwrap(), "5\n");
}

#[test]
fn test_out_of_range_reference_fails() {
    let err = run(
        MemoryProducer::new(scenario_rows(), Window::all()),
        MemoryConsumer::new(),
        &["$0", "$9"],
    )
    .unwrap_err();

    match err {
        XclError::UnboundColumn { row, column, .. } => assert_eq!((row, column), (0, 9)),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_dependency_ordering_through_csv() {
    let input = "a,1,x\nb,2,y\n";
    let reader = CsvCellReader::new(
        input.as_bytes(),
        Window::all(),
        &CsvReadOptions {
            infer_types: true,
            ..Default::default()
        },
    );
    let mut sink = MemoryConsumer::new();

    run(reader, &mut sink, &["$2", "$1 * 10", "$0"]).unwrap();

    assert_eq!(
        sink.rows_as_strings(),
        vec![vec!["x", "10", "a"], vec!["y", "20", "b"]]
    );
}

#[test]
fn test_type_mismatch_keeps_only_complete_rows() {
    let rows = vec![
        vec!["head".into(), "er".into(), "row".into()],
        vec!["ok".into(), f64::NAN.into(), "after".into()],
    ];
    let mut writer =
        XlsxCellWriter::new(Cursor::new(Vec::new()), &XlsxWriteOptions::default()).unwrap();

    let err = run::<_, _, &str>(MemoryProducer::new(rows, Window::all()), &mut writer, &[]).unwrap_err();
    assert!(matches!(err, XclError::Core(ref e) if e.is_type_mismatch()));

    let bytes = writer.into_inner().unwrap().into_inner();
    let (csv, _) = xlsx_to_csv(bytes, Window::all(), "tab1", &[]);
    assert_eq!(csv, "head,er,row\r\n");
}
