//! File conversions through `convert`

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::fs;
use xcl::prelude::*;

fn source(path: &std::path::Path) -> Source {
    Source::new(Location::Path(path.to_path_buf()), Format::from_path(path).unwrap())
}

fn sink(path: &std::path::Path) -> Sink {
    Sink::new(Location::Path(path.to_path_buf()), Format::from_path(path).unwrap())
}

#[test]
fn test_csv_to_xlsx_to_csv() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let book = dir.path().join("book.xlsx");
    let output = dir.path().join("out.csv");

    let text = "name,amount,flag\r\n\"Smith, J\",0012.50,true\r\n,, \r\nü,-3,\"say \"\"hi\"\"\"\r\n";
    fs::write(&input, text).unwrap();

    let mut create = sink(&book);
    create.xlsx = XlsxWriteOptions::sheet("tab1");
    convert::<&str>(&source(&input), &create, &[]).unwrap();

    let mut read = source(&book);
    read.xlsx = XlsxReadOptions::sheet("tab1");
    let stats = convert::<&str>(&read, &sink(&output), &[]).unwrap();

    assert_eq!(stats.rows_written, 4);
    let expected = "name,amount,flag\r\n\"Smith, J\",0012.50,true\r\n,,\r\nü,-3,\"say \"\"hi\"\"\"\r\n";
    assert_eq!(fs::read_to_string(&output).unwrap(), expected);
}

#[test]
fn test_typed_csv_to_xlsx() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let book = dir.path().join("book.xlsx");
    fs::write(&input, "1.5,true,text\n").unwrap();

    let mut from = source(&input);
    from.csv.infer_types = true;
    convert::<&str>(&from, &sink(&book), &[]).unwrap();

    let cells: Vec<Cell> = XlsxCellReader::open(&book, Window::all(), &XlsxReadOptions::default())
        .unwrap()
        .collect::<xcl_core::Result<_>>()
        .unwrap();
    assert_eq!(
        cells,
        vec![Cell::at(0, 0, 1.5), Cell::at(0, 1, true), Cell::at(0, 2, "text")]
    );
}

#[test]
fn test_dates_round_trip_through_xlsx() {
    let dir = tempfile::tempdir().unwrap();
    let book = dir.path().join("dates.xlsx");

    let day = NaiveDate::from_ymd_opt(2023, 7, 14).unwrap();
    let rows = vec![vec![
        CellValue::Date(day.and_hms_opt(0, 0, 0).unwrap()),
        CellValue::Date(day.and_hms_opt(18, 45, 30).unwrap()),
    ]];
    {
        let writer = XlsxCellWriter::create(&book, &XlsxWriteOptions::default()).unwrap();
        run::<_, _, &str>(MemoryProducer::new(rows.clone(), Window::all()), writer, &[]).unwrap();
    }

    let output = dir.path().join("dates.csv");
    convert(&source(&book), &sink(&output), &["$0", "$1", "YEAR($0)", "$1 - $0"]).unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        format!("2023-07-14,2023-07-14T18:45:30,2023,{}\r\n", 67_530_000.0 / 86_400_000.0)
    );
}

#[test]
fn test_expressions_into_xlsx_keep_types() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let book = dir.path().join("out.xlsx");
    fs::write(&input, "2,x\n3,y\n").unwrap();

    convert(&source(&input), &sink(&book), &["VALUE($0) * 2", "UPPER($1)", "VALUE($0) > 2"]).unwrap();

    let cells: Vec<Cell> = XlsxCellReader::open(&book, Window::all(), &XlsxReadOptions::default())
        .unwrap()
        .collect::<xcl_core::Result<_>>()
        .unwrap();
    assert_eq!(
        cells,
        vec![
            Cell::at(0, 0, 4.0),
            Cell::at(0, 1, "X"),
            Cell::at(0, 2, false),
            Cell::at(1, 0, 6.0),
            Cell::at(1, 1, "Y"),
            Cell::at(1, 2, true),
        ]
    );
}
