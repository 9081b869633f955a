//! XLSX reader

use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::options::XlsxReadOptions;
use crate::styles::read_date_styles;
use xcl_core::{date, Address, Cell, CellError, CellProducer, CellValue, Result, Window};

/// Largest preallocation taken from a zip entry header
const MAX_SIZE_HINT: u64 = 1 << 24;

/// Capacity to reserve for an entry whose header declares `declared` bytes
fn size_hint(declared: u64) -> usize {
    declared.min(MAX_SIZE_HINT) as usize
}

/// Decode Excel's `_xHHHH_` escape sequences
///
/// Excel uses this format to encode special characters in XML:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (escaped underscore)
fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];

        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }

    result.push_str(rest);
    result
}

fn attr_string(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|s| s.to_string()))
}

/// Read the shared strings table
fn read_shared_strings<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> XlsxResult<Vec<String>> {
    let mut strings = Vec::new();

    let file = match archive.by_name("xl/sharedStrings.xml") {
        Ok(f) => f,
        Err(_) => return Ok(strings), // No shared strings is valid
    };

    let mut xml_reader = Reader::from_reader(BufReader::new(file));

    let mut buf = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_t = false;
    // Phonetic runs (<rPh>) carry their own <t> that is not part of the text
    let mut in_phonetic = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"rPh" => in_phonetic = true,
                b"t" if in_si && !in_phonetic => in_t = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"si" => {
                    strings.push(decode_excel_escapes(&current));
                    in_si = false;
                }
                b"rPh" => in_phonetic = false,
                b"t" => in_t = false,
                _ => {}
            },
            Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => strings.push(String::new()),
            Ok(Event::Text(e)) if in_t => {
                current.push_str(&e.unescape()?);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}

fn read_styles<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> XlsxResult<Vec<bool>> {
    match archive.by_name("xl/styles.xml") {
        Ok(file) => read_date_styles(file),
        Err(_) => Ok(Vec::new()),
    }
}

/// Sheets of a workbook in order, with the date system it uses
struct WorkbookInfo {
    /// (sheet name, relationship id)
    sheets: Vec<(String, String)>,
    date_1904: bool,
}

/// Read workbook.xml to get sheet names, rIds and the date system
fn read_workbook_xml<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> XlsxResult<WorkbookInfo> {
    let file = archive
        .by_name("xl/workbook.xml")
        .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

    let mut xml_reader = Reader::from_reader(BufReader::new(file));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut info = WorkbookInfo {
        sheets: Vec::new(),
        date_1904: false,
    };

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.name().as_ref() {
                b"sheet" => {
                    let name = attr_string(&e, b"name");
                    let r_id = attr_string(&e, b"r:id");
                    if let (Some(name), Some(r_id)) = (name, r_id) {
                        info.sheets.push((name, r_id));
                    }
                }
                b"workbookPr" => {
                    info.date_1904 = attr_string(&e, b"date1904")
                        .map_or(false, |v| v == "1" || v.eq_ignore_ascii_case("true"));
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(info)
}

/// Read workbook.xml.rels to get worksheet part paths by relationship id
fn read_workbook_rels<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> XlsxResult<HashMap<String, String>> {
    let file = archive
        .by_name("xl/_rels/workbook.xml.rels")
        .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

    let mut xml_reader = Reader::from_reader(BufReader::new(file));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut rels = HashMap::new();

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"Relationship" => {
                let id = attr_string(&e, b"Id");
                let target = attr_string(&e, b"Target");
                let rel_type = attr_string(&e, b"Type");

                // Only include worksheet relationships
                if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                    if rel_type.ends_with("/worksheet") {
                        // Target is relative to xl/ folder
                        let full_path = match target.strip_prefix('/') {
                            Some(absolute) => absolute.to_string(),
                            None => format!("xl/{}", target),
                        };
                        rels.insert(id, full_path);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

/// Which element's text is being collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextTarget {
    None,
    Value,
    Formula,
    Inline,
}

/// A `<c>` element being decoded
#[derive(Debug, Default)]
struct RawCell {
    column: u32,
    kind: Option<String>,
    style: Option<u32>,
    value: Option<String>,
    formula: Option<String>,
    inline: Option<String>,
    in_inline: bool,
    skip: bool,
}

/// Lazy XLSX cell producer
///
/// The archive's shared strings, styles and workbook parts are read up front;
/// the worksheet part is decompressed into memory and then decoded event by
/// event as cells are requested. Rows before the window are skipped without
/// building cells and decoding stops at the first row past it.
pub struct XlsxCellReader {
    /// `None` when the requested sheet does not exist
    xml: Option<Reader<Cursor<Vec<u8>>>>,
    buf: Vec<u8>,
    shared_strings: Vec<String>,
    date_styles: Vec<bool>,
    date_1904: bool,
    window: Window,
    missing: Option<String>,
    /// Cells decoded but not yet yielded (gap fillers plus one real cell)
    pending: VecDeque<Cell>,
    /// Row being decoded, `None` outside a row or inside a skipped row
    row: Option<u32>,
    last_row: Option<u32>,
    /// Next column to yield in the current row
    next_column: u32,
    /// Column of a `<c>` without an `r` attribute
    implicit_column: u32,
    cell: Option<RawCell>,
    text: TextTarget,
    done: bool,
}

impl XlsxCellReader {
    /// Open an XLSX file
    pub fn open<P: AsRef<Path>>(
        path: P,
        window: Window,
        options: &XlsxReadOptions,
    ) -> XlsxResult<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file), window, options)
    }

    /// Read XLSX from any seekable reader
    pub fn new<R: Read + Seek>(
        reader: R,
        window: Window,
        options: &XlsxReadOptions,
    ) -> XlsxResult<Self> {
        log::debug!("xlsx reader: window {:?}, options {:?}", window, options);

        let mut archive = zip::ZipArchive::new(reader)?;

        let workbook = read_workbook_xml(&mut archive)?;
        let rels = read_workbook_rels(&mut archive)?;

        let sheet = match &options.sheet {
            Some(name) => workbook.sheets.iter().find(|(n, _)| n == name),
            None => workbook.sheets.first(),
        };

        let Some((name, r_id)) = sheet else {
            let name = options.sheet.clone().unwrap_or_default();
            log::debug!("xlsx reader: sheet '{}' not found in workbook", name);
            return Ok(Self::with_state(None, Vec::new(), Vec::new(), false, window, Some(name)));
        };

        let path = rels
            .get(r_id)
            .ok_or_else(|| XlsxError::InvalidFormat(format!("no worksheet part for sheet '{}'", name)))?;
        log::debug!("xlsx reader: sheet '{}' at {}", name, path);

        let shared_strings = read_shared_strings(&mut archive)?;
        let date_styles = read_styles(&mut archive)?;

        let mut part = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.clone()))?;
        let mut bytes = Vec::with_capacity(size_hint(part.size()));
        part.read_to_end(&mut bytes)?;

        let xml = Reader::from_reader(Cursor::new(bytes));

        Ok(Self::with_state(
            Some(xml),
            shared_strings,
            date_styles,
            workbook.date_1904,
            window,
            None,
        ))
    }

    fn with_state(
        xml: Option<Reader<Cursor<Vec<u8>>>>,
        shared_strings: Vec<String>,
        date_styles: Vec<bool>,
        date_1904: bool,
        window: Window,
        missing: Option<String>,
    ) -> Self {
        Self {
            done: xml.is_none(),
            xml,
            buf: Vec::new(),
            shared_strings,
            date_styles,
            date_1904,
            window,
            missing,
            pending: VecDeque::new(),
            row: None,
            last_row: None,
            next_column: 0,
            implicit_column: 0,
            cell: None,
            text: TextTarget::None,
        }
    }

    fn start_row(&mut self, e: &BytesStart) {
        let row = attr_string(e, b"r")
            .and_then(|r| r.parse::<u32>().ok())
            .map(|r| r.saturating_sub(1)) // 1-based to 0-based
            .unwrap_or_else(|| self.last_row.map_or(0, |r| r + 1));
        self.last_row = Some(row);

        if self.window.is_past(row) {
            self.done = true;
            return;
        }

        self.row = self.window.row_in_range(row).then_some(row);
        self.next_column = self.window.start.column;
        self.implicit_column = 0;
    }

    fn start_cell(&mut self, e: &BytesStart) {
        let mut cell = RawCell::default();

        let mut reference = None;
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => reference = attr.unescape_value().ok().map(|s| s.to_string()),
                b"t" => cell.kind = attr.unescape_value().ok().map(|s| s.to_string()),
                b"s" => {
                    cell.style = attr.unescape_value().ok().and_then(|s| s.parse::<u32>().ok())
                }
                _ => {}
            }
        }

        cell.column = reference
            .and_then(|r| Address::parse_a1(&r).ok())
            .map_or(self.implicit_column, |a| a.column);
        self.implicit_column = cell.column + 1;
        cell.skip = self.row.is_none() || !self.window.column_in_range(cell.column);

        self.cell = Some(cell);
    }

    fn push_text(&mut self, text: &str) {
        let Some(cell) = self.cell.as_mut().filter(|c| !c.skip) else {
            return;
        };
        let slot = match self.text {
            TextTarget::None => return,
            TextTarget::Value => &mut cell.value,
            TextTarget::Formula => &mut cell.formula,
            TextTarget::Inline => &mut cell.inline,
        };
        slot.get_or_insert_with(String::new).push_str(text);
    }

    fn finish_cell(&mut self) -> XlsxResult<()> {
        self.text = TextTarget::None;
        let (Some(raw), Some(row)) = (self.cell.take(), self.row) else {
            return Ok(());
        };
        if raw.skip {
            return Ok(());
        }

        let value = self.cell_value(&raw)?;

        // Fill physically absent columns so the row has no holes
        for column in self.next_column..raw.column {
            self.pending
                .push_back(Cell::new(Address::new(row, column), CellValue::Empty));
        }
        self.pending
            .push_back(Cell::new(Address::new(row, raw.column), value));
        self.next_column = self.next_column.max(raw.column + 1);
        Ok(())
    }

    fn cell_value(&self, raw: &RawCell) -> XlsxResult<CellValue> {
        if let Some(f) = raw.formula.as_deref().filter(|f| !f.is_empty()) {
            return Ok(CellValue::formula(f));
        }

        let kind = raw.kind.as_deref();
        if kind == Some("inlineStr") {
            return Ok(raw
                .inline
                .as_deref()
                .map_or(CellValue::Empty, |s| CellValue::String(decode_excel_escapes(s))));
        }

        let Some(value) = raw.value.as_deref() else {
            return Ok(CellValue::Empty);
        };

        let cell_value = match kind {
            // Shared string
            Some("s") => {
                let idx: usize = value.trim().parse().map_err(|_| {
                    XlsxError::Parse(format!("Invalid shared string index: {}", value))
                })?;
                let s = self.shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                })?;
                CellValue::String(s.clone())
            }

            Some("b") => CellValue::Boolean(value == "1" || value.eq_ignore_ascii_case("true")),

            Some("e") => CellError::parse(value)
                .map(CellValue::Error)
                .unwrap_or_else(|| CellValue::string(value)),

            Some("str") => CellValue::String(decode_excel_escapes(value)),

            Some("d") => date::parse_iso(value)
                .map(CellValue::Date)
                .unwrap_or_else(|| CellValue::string(value)),

            // Number (default type or explicit "n")
            None | Some("n") => match value.trim().parse::<f64>() {
                Ok(n) if self.is_date_style(raw.style) => date::serial_to_datetime(n, self.date_1904)
                    .map(CellValue::Date)
                    .unwrap_or(CellValue::Number(n)),
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::string(value),
            },

            // Unknown type - treat as string
            Some(_) => CellValue::string(value),
        };

        Ok(cell_value)
    }

    fn is_date_style(&self, style: Option<u32>) -> bool {
        style.map_or(false, |s| {
            self.date_styles.get(s as usize).copied().unwrap_or(false)
        })
    }

    /// Decode worksheet events until at least one cell is pending or the sheet ends
    fn fill_pending(&mut self) -> XlsxResult<()> {
        let mut buf = std::mem::take(&mut self.buf);

        while self.pending.is_empty() && !self.done {
            let Some(xml) = self.xml.as_mut() else {
                self.done = true;
                break;
            };

            match xml.read_event_into(&mut buf)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"row" => self.start_row(&e),
                    b"c" => self.start_cell(&e),
                    b"v" if self.cell.is_some() => self.text = TextTarget::Value,
                    b"f" if self.cell.is_some() => self.text = TextTarget::Formula,
                    b"is" => {
                        if let Some(cell) = self.cell.as_mut() {
                            cell.in_inline = true;
                        }
                    }
                    b"t" if self.cell.as_ref().map_or(false, |c| c.in_inline) => {
                        self.text = TextTarget::Inline
                    }
                    _ => {}
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"row" => {
                        self.start_row(&e);
                        self.row = None;
                    }
                    b"c" => {
                        self.start_cell(&e);
                        self.finish_cell()?;
                    }
                    _ => {}
                },
                Event::Text(e) => {
                    if self.text != TextTarget::None {
                        let text = e.unescape()?;
                        self.push_text(&text);
                    }
                }
                Event::End(e) => match e.name().as_ref() {
                    b"c" => self.finish_cell()?,
                    b"row" => self.row = None,
                    b"v" | b"f" | b"t" => self.text = TextTarget::None,
                    b"sheetData" => self.done = true,
                    _ => {}
                },
                Event::Eof => self.done = true,
                _ => {}
            }
            buf.clear();
        }

        self.buf = buf;
        Ok(())
    }
}

impl Iterator for XlsxCellReader {
    type Item = Result<Cell>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pending.is_empty() {
            if let Err(e) = self.fill_pending() {
                self.done = true;
                self.pending.clear();
                return Some(Err(e.into()));
            }
        }
        self.pending.pop_front().map(Ok)
    }
}

impl CellProducer for XlsxCellReader {
    fn source_missing(&self) -> Option<&str> {
        self.missing.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const WORKBOOK_RELS: &str = r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

    /// Minimal package with one sheet named "data"
    fn package(sheet_data: &str, shared: Option<&str>, styles: Option<&str>) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = zip::write::SimpleFileOptions::default();

            zip.start_file("xl/workbook.xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="data" sheetId="1" r:id="rId1"/></sheets></workbook>"#).unwrap();

            zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
            zip.write_all(WORKBOOK_RELS.as_bytes()).unwrap();

            if let Some(shared) = shared {
                zip.start_file("xl/sharedStrings.xml", options).unwrap();
                zip.write_all(shared.as_bytes()).unwrap();
            }
            if let Some(styles) = styles {
                zip.start_file("xl/styles.xml", options).unwrap();
                zip.write_all(styles.as_bytes()).unwrap();
            }

            zip.start_file("xl/worksheets/sheet1.xml", options).unwrap();
            write!(
                zip,
                r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
                sheet_data
            )
            .unwrap();

            zip.finish().unwrap();
        }
        buf
    }

    fn read_all(bytes: Vec<u8>, window: Window, options: &XlsxReadOptions) -> Vec<Cell> {
        XlsxCellReader::new(Cursor::new(bytes), window, options)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_decode_excel_escapes() {
        assert_eq!(decode_excel_escapes("hello_x000d_world"), "hello\rworld");
        assert_eq!(decode_excel_escapes("line1_x000d__x000a_line2"), "line1\r\nline2");
        assert_eq!(decode_excel_escapes("under_x005f_score"), "under_score");
        assert_eq!(decode_excel_escapes("_x000D_"), "\r");
        assert_eq!(decode_excel_escapes("plain text"), "plain text");
    }

    #[test]
    fn test_declared_size_is_capped() {
        assert_eq!(size_hint(1024), 1024);
        assert_eq!(size_hint(u64::MAX), 1 << 24);
    }

    #[test]
    fn test_decode_excel_escapes_partial_sequence() {
        assert_eq!(decode_excel_escapes("_x00"), "_x00");
        assert_eq!(decode_excel_escapes("_x000d"), "_x000d");
        assert_eq!(decode_excel_escapes("_xzzzz_"), "_xzzzz_");
    }

    #[test]
    fn test_cell_types() {
        let shared = r#"<sst><si><t>A</t></si><si><r><t>te</t></r><r><t>ste1</t></r></si></sst>"#;
        let styles = r#"<styleSheet><cellXfs><xf numFmtId="0"/><xf numFmtId="14"/></cellXfs></styleSheet>"#;
        let data = r#"<row r="1">
            <c r="A1" t="s"><v>0</v></c>
            <c r="B1" t="s"><v>1</v></c>
            <c r="C1"><v>1.5</v></c>
            <c r="D1" t="b"><v>1</v></c>
            <c r="E1" t="e"><v>#DIV/0!</v></c>
            <c r="F1" s="1"><v>45000</v></c>
            <c r="G1"><f>SUM(C1:C1)</f><v>1.5</v></c>
            <c r="H1" t="inlineStr"><is><t>inline</t></is></c>
            <c r="I1" t="d"><v>2024-01-31T10:00:00</v></c>
            <c r="J1" t="str"><v>a_x000a_b</v></c>
        </row>"#;
        let cells = read_all(package(data, Some(shared), Some(styles)), Window::all(), &Default::default());

        let values: Vec<CellValue> = cells.into_iter().map(|c| c.value).collect();
        assert_eq!(
            values,
            vec![
                CellValue::string("A"),
                CellValue::string("teste1"),
                CellValue::Number(1.5),
                CellValue::Boolean(true),
                CellValue::Error(CellError::Div0),
                CellValue::Date(date::serial_to_datetime(45000.0, false).unwrap()),
                CellValue::Formula("SUM(C1:C1)".into()),
                CellValue::string("inline"),
                CellValue::Date(date::parse_iso("2024-01-31T10:00:00").unwrap()),
                CellValue::string("a\nb"),
            ]
        );
    }

    #[test]
    fn test_column_gaps_are_filled() {
        let data = r#"<row r="1"><c r="A1"><v>1</v></c><c r="B1" s="0"/><c r="D1"><v>4</v></c></row>
                      <row r="3"><c r="C3"><v>9</v></c></row>"#;
        let cells = read_all(package(data, None, None), Window::all(), &Default::default());

        assert_eq!(
            cells,
            vec![
                Cell::at(0, 0, 1.0),
                Cell::at(0, 1, CellValue::Empty),
                Cell::at(0, 2, CellValue::Empty),
                Cell::at(0, 3, 4.0),
                Cell::at(2, 0, CellValue::Empty),
                Cell::at(2, 1, CellValue::Empty),
                Cell::at(2, 2, 9.0),
            ]
        );
    }

    #[test]
    fn test_window_and_header() {
        let data = r#"<row r="1"><c r="A1"><v>1</v></c><c r="B1"><v>2</v></c><c r="C1"><v>3</v></c></row>
                      <row r="2"><c r="A2"><v>4</v></c><c r="B2"><v>5</v></c><c r="C2"><v>6</v></c></row>
                      <row r="3"><c r="A3"><v>7</v></c><c r="B3"><v>8</v></c><c r="C3"><v>9</v></c></row>
                      <row r="4"><c r="A4"><v>10</v></c></row>"#;
        let window = Window::new(Address::new(0, 1), Some(Address::new(2, 1))).with_header_removed(true);
        let cells = read_all(package(data, None, None), window, &Default::default());

        assert_eq!(cells, vec![Cell::at(1, 1, 5.0), Cell::at(2, 1, 8.0)]);
    }

    #[test]
    fn test_rows_without_reference() {
        let data = r#"<row><c><v>1</v></c><c><v>2</v></c></row><row><c><v>3</v></c></row>"#;
        let cells = read_all(package(data, None, None), Window::all(), &Default::default());
        assert_eq!(cells, vec![Cell::at(0, 0, 1.0), Cell::at(0, 1, 2.0), Cell::at(1, 0, 3.0)]);
    }

    #[test]
    fn test_select_sheet_by_name() {
        let data = r#"<row r="1"><c r="A1"><v>1</v></c></row>"#;
        let cells = read_all(package(data, None, None), Window::all(), &XlsxReadOptions::sheet("data"));
        assert_eq!(cells, vec![Cell::at(0, 0, 1.0)]);
    }

    #[test]
    fn test_missing_sheet_is_empty() {
        let data = r#"<row r="1"><c r="A1"><v>1</v></c></row>"#;
        let mut reader = XlsxCellReader::new(
            Cursor::new(package(data, None, None)),
            Window::all(),
            &XlsxReadOptions::sheet("nope"),
        )
        .unwrap();

        assert_eq!(reader.source_missing(), Some("nope"));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_not_a_zip() {
        let result = XlsxCellReader::new(Cursor::new(b"a,b\n".to_vec()), Window::all(), &Default::default());
        assert!(matches!(result, Err(XlsxError::Zip(_))));
    }

    #[test]
    fn test_bad_shared_string_index() {
        let data = r#"<row r="1"><c r="A1" t="s"><v>7</v></c></row>"#;
        let mut reader =
            XlsxCellReader::new(Cursor::new(package(data, None, None)), Window::all(), &Default::default())
                .unwrap();
        assert!(matches!(reader.next(), Some(Err(_))));
        assert!(reader.next().is_none());
    }
}
