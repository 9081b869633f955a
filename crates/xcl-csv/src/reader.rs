//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::CsvReadOptions;
use xcl_core::{Address, Cell, CellProducer, CellType, CellValue, Result, Window};

/// Lazy CSV cell producer
///
/// Records are read from the source only as cells are requested. Rows count
/// records (blank lines and comments do not count), columns count fields.
pub struct CsvCellReader<R: Read> {
    reader: csv::Reader<R>,
    record: csv::StringRecord,
    window: Window,
    infer_types: bool,
    /// Index the next record read from the source will get
    next_row: u32,
    /// Row of the record held in `record`, if it still has cells to yield
    row: Option<u32>,
    column: usize,
    done: bool,
}

impl CsvCellReader<File> {
    /// Open a CSV file
    pub fn open<P: AsRef<Path>>(
        path: P,
        window: Window,
        options: &CsvReadOptions,
    ) -> CsvResult<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file, window, options))
    }
}

impl<R: Read> CsvCellReader<R> {
    /// Read CSV from any reader
    pub fn new(reader: R, window: Window, options: &CsvReadOptions) -> Self {
        log::debug!("csv reader: window {:?}, options {:?}", window, options);

        let mut builder = csv::ReaderBuilder::new();
        builder
            .delimiter(options.delimiter)
            .has_headers(false)
            .flexible(true)
            .escape(options.escape)
            .comment(options.comment);
        match options.quote {
            Some(quote) => builder.quote(quote),
            None => builder.quoting(false),
        };
        if options.trim {
            builder.trim(csv::Trim::All);
        }

        Self {
            reader: builder.from_reader(reader),
            record: csv::StringRecord::new(),
            window,
            infer_types: options.infer_types,
            next_row: 0,
            row: None,
            column: 0,
            done: false,
        }
    }

    /// Detect the type of a field value
    fn detect_type(field: &str) -> CellType {
        if field.is_empty() {
            return CellType::Empty;
        }
        if field.eq_ignore_ascii_case("true") || field.eq_ignore_ascii_case("false") {
            return CellType::Boolean;
        }
        match field.parse::<f64>() {
            Ok(n) if n.is_finite() => CellType::Number,
            _ => CellType::String,
        }
    }

    /// Next cell of the held record, if any is left inside the window
    fn next_in_record(&mut self, row: u32) -> Option<Result<Cell>> {
        while let Some(field) = self.record.get(self.column) {
            let column = self.column as u32;
            self.column += 1;

            if self.window.is_past_column(column) {
                break;
            }
            if !self.window.column_in_range(column) {
                continue;
            }

            let address = Address::new(row, column);
            if !self.infer_types {
                return Some(Ok(Cell::new(address, CellValue::string(field))));
            }
            let field = field.trim();
            return Some(Cell::typed(address, Self::detect_type(field), field));
        }

        self.row = None;
        None
    }

    /// Load the next record inside the window; `false` at end of input
    fn advance_record(&mut self) -> CsvResult<bool> {
        loop {
            if !self.reader.read_record(&mut self.record)? {
                return Ok(false);
            }

            let row = self.next_row;
            self.next_row += 1;

            if self.window.is_past(row) {
                return Ok(false);
            }
            if self.window.row_in_range(row) {
                self.row = Some(row);
                self.column = 0;
                return Ok(true);
            }
        }
    }
}

impl<R: Read> Iterator for CsvCellReader<R> {
    type Item = Result<Cell>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }

            if let Some(row) = self.row {
                if let Some(cell) = self.next_in_record(row) {
                    return Some(cell);
                }
            }

            match self.advance_record() {
                Ok(true) => {}
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}

impl<R: Read> CellProducer for CsvCellReader<R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn read(input: &str, window: Window, options: &CsvReadOptions) -> Vec<Cell> {
        CsvCellReader::new(input.as_bytes(), window, options)
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    fn strings(cells: &[Cell]) -> Vec<String> {
        cells.iter().map(|c| c.value.to_string()).collect()
    }

    #[test]
    fn test_reads_every_field_as_text() {
        let cells = read("A,B\r\n1, true \r\n", Window::all(), &CsvReadOptions::default());
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[2], Cell::at(1, 0, "1"));
        assert_eq!(cells[3], Cell::at(1, 1, "true"));
    }

    #[test]
    fn test_infer_types() {
        let options = CsvReadOptions {
            infer_types: true,
            ..Default::default()
        };
        let cells = read("x,1.5,TRUE,,false", Window::all(), &options);
        let values: Vec<CellValue> = cells.into_iter().map(|c| c.value).collect();
        assert_eq!(
            values,
            vec![
                CellValue::string("x"),
                CellValue::Number(1.5),
                CellValue::Boolean(true),
                CellValue::Empty,
                CellValue::Boolean(false),
            ]
        );
    }

    #[test]
    fn test_non_finite_numbers_stay_text() {
        let options = CsvReadOptions {
            infer_types: true,
            ..Default::default()
        };
        let cells = read("NaN,inf, 7 ", Window::all(), &options);
        assert_eq!(
            cells,
            vec![Cell::at(0, 0, "NaN"), Cell::at(0, 1, "inf"), Cell::at(0, 2, 7.0)]
        );
    }

    #[test]
    fn test_blank_lines_do_not_count_as_rows() {
        let cells = read("a\n\nb\n", Window::all(), &CsvReadOptions::default());
        assert_eq!(cells, vec![Cell::at(0, 0, "a"), Cell::at(1, 0, "b")]);
    }

    #[test]
    fn test_window_and_header() {
        let input = "h1,h2,h3\na,b,c\nd,e,f\ng,h,i\n";
        let window = Window::new(Address::new(0, 1), Some(Address::new(2, 2)))
            .with_header_removed(true);
        let cells = read(input, window, &CsvReadOptions::default());
        assert_eq!(strings(&cells), vec!["b", "c", "e", "f"]);
        assert_eq!(cells[0].address, Address::new(1, 1));
    }

    #[test]
    fn test_ragged_records() {
        let cells = read("a,b,c\nd\n", Window::all(), &CsvReadOptions::default());
        assert_eq!(strings(&cells), vec!["a", "b", "c", "d"]);
        assert_eq!(cells[3].address, Address::new(1, 0));
    }

    #[test]
    fn test_delimiter_comment_and_quoting() {
        let options = CsvReadOptions {
            delimiter: b';',
            comment: Some(b'#'),
            ..Default::default()
        };
        let cells = read("# skipped\n\"x;y\";z\n", Window::all(), &options);
        assert_eq!(strings(&cells), vec!["x;y", "z"]);

        let options = CsvReadOptions {
            quote: None,
            ..Default::default()
        };
        let cells = read("\"a\",b\n", Window::all(), &options);
        assert_eq!(strings(&cells), vec!["\"a\"", "b"]);
    }

    #[test]
    fn test_stops_after_window_end() {
        let input = "a\nb\nc\nd\n";
        let window = Window::new(Address::new(0, 0), Some(Address::new(1, 0)));
        let cells = read(input, window, &CsvReadOptions::default());
        assert_eq!(strings(&cells), vec!["a", "b"]);
    }

    #[test]
    fn test_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.csv");
        std::fs::write(&path, "a,b\n").unwrap();

        let cells: Vec<Cell> = CsvCellReader::open(&path, Window::all(), &CsvReadOptions::default())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(strings(&cells), vec!["a", "b"]);
    }
}
