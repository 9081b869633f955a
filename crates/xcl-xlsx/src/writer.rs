//! XLSX writer

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::{XlsxError, XlsxResult};
use crate::options::XlsxWriteOptions;
use crate::styles::{DATETIME_STYLE, DATE_STYLE, STYLES_XML};
use xcl_core::{date, Cell, CellConsumer, CellType, CellValue, Error, Result, MAX_COLS, MAX_ROWS};

const WORKSHEET_PATH: &str = "xl/worksheets/sheet1.xml";

/// XLSX cell consumer
///
/// Writes a single-sheet workbook. Every part except the worksheet is written
/// when the writer is created; cells of one row are collected into a `<row>`
/// element that is streamed into the worksheet part once the row is complete.
/// Closing (or dropping) the writer ends the worksheet and finishes the
/// package.
pub struct XlsxCellWriter<W: Write + Seek> {
    zip: Option<ZipWriter<W>>,
    /// The underlying writer, once the package is finished
    inner: Option<W>,
    row_xml: String,
    current_row: Option<u32>,
    closed: bool,
}

impl XlsxCellWriter<BufWriter<File>> {
    /// Create (or truncate) an XLSX file
    pub fn create<P: AsRef<Path>>(path: P, options: &XlsxWriteOptions) -> XlsxResult<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file), options)
    }
}

impl<W: Write + Seek> XlsxCellWriter<W> {
    /// Write XLSX to any seekable writer
    pub fn new(writer: W, options: &XlsxWriteOptions) -> XlsxResult<Self> {
        log::debug!("xlsx writer: options {:?}", options);
        validate_sheet_name(&options.sheet)?;

        let mut zip = ZipWriter::new(writer);

        write_part(&mut zip, "[Content_Types].xml", CONTENT_TYPES_XML)?;
        write_part(&mut zip, "_rels/.rels", ROOT_RELS_XML)?;
        write_part(&mut zip, "xl/workbook.xml", &workbook_xml(&options.sheet))?;
        write_part(&mut zip, "xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML)?;
        write_part(&mut zip, "xl/styles.xml", STYLES_XML)?;

        zip.start_file(WORKSHEET_PATH, SimpleFileOptions::default())?;
        zip.write_all(WORKSHEET_START.as_bytes())?;

        Ok(Self {
            zip: Some(zip),
            inner: None,
            row_xml: String::new(),
            current_row: None,
            closed: false,
        })
    }

    /// Close the writer and return the underlying writer
    pub fn into_inner(mut self) -> XlsxResult<W> {
        self.close()?;
        self.inner.take().ok_or(XlsxError::Core(Error::Closed))
    }

    fn write_row(&mut self) -> XlsxResult<()> {
        if let Some(row) = self.current_row.take() {
            let zip = self.zip.as_mut().ok_or(XlsxError::Core(Error::Closed))?;
            write!(zip, "\n    <row r=\"{}\">{}</row>", row + 1, self.row_xml)?;
            self.row_xml.clear();
        }
        Ok(())
    }

    fn finish(&mut self) -> XlsxResult<()> {
        self.write_row()?;
        if let Some(mut zip) = self.zip.take() {
            zip.write_all(WORKSHEET_END.as_bytes())?;
            let mut inner = zip.finish()?;
            inner.flush()?;
            self.inner = Some(inner);
        }
        Ok(())
    }
}

impl<W: Write + Seek> CellConsumer for XlsxCellWriter<W> {
    fn accept(&mut self, cell: Cell) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }

        if self.current_row.map_or(false, |row| row != cell.row()) {
            self.write_row()?;
        }

        let xml = match cell_xml(&cell) {
            Ok(xml) => xml,
            Err(e) => {
                // A row with a rejected cell is never written
                self.row_xml.clear();
                self.current_row = None;
                return Err(e);
            }
        };
        self.current_row = Some(cell.row());
        if let Some(xml) = xml {
            self.row_xml.push_str(&xml);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.finish().map_err(Error::from)
    }
}

impl<W: Write + Seek> Drop for XlsxCellWriter<W> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::error!("failed to close XLSX output: {}", e);
        }
    }
}

/// Render one cell as a `<c>` element, `None` for empty cells
fn cell_xml(cell: &Cell) -> Result<Option<String>> {
    let address = cell.address;
    if address.row >= MAX_ROWS || address.column >= MAX_COLS {
        return Err(Error::InvalidAddress(format!(
            "{} is outside the worksheet",
            address
        )));
    }
    let cell_ref = address.to_a1_string();

    let xml = match &cell.value {
        CellValue::Number(n) => {
            if !n.is_finite() {
                return Err(Error::type_mismatch(address, CellType::Number, n.to_string()));
            }
            format!("<c r=\"{}\"><v>{}</v></c>", cell_ref, n)
        }
        CellValue::String(s) => format!(
            "<c r=\"{}\" t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
            cell_ref,
            escape_text(s)
        ),
        CellValue::Boolean(b) => {
            format!("<c r=\"{}\" t=\"b\"><v>{}</v></c>", cell_ref, if *b { 1 } else { 0 })
        }
        CellValue::Date(dt) => {
            let serial = date::datetime_to_serial(dt, false).ok_or_else(|| {
                Error::type_mismatch(address, CellType::Date, date::format_iso(dt))
            })?;
            let style = if serial.fract() == 0.0 {
                DATE_STYLE
            } else {
                DATETIME_STYLE
            };
            format!("<c r=\"{}\" s=\"{}\"><v>{}</v></c>", cell_ref, style, serial)
        }
        CellValue::Formula(f) => format!("<c r=\"{}\"><f>{}</f></c>", cell_ref, escape_xml(f)),
        CellValue::Error(e) => {
            format!("<c r=\"{}\" t=\"e\"><v>{}</v></c>", cell_ref, escape_xml(e.as_str()))
        }
        CellValue::Empty => return Ok(None),
    };

    Ok(Some(xml))
}

fn write_part<W: Write + Seek>(zip: &mut ZipWriter<W>, name: &str, content: &str) -> XlsxResult<()> {
    zip.start_file(name, SimpleFileOptions::default())?;
    zip.write_all(content.as_bytes())?;
    Ok(())
}

fn validate_sheet_name(name: &str) -> XlsxResult<()> {
    const FORBIDDEN: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

    if name.is_empty() || name.chars().count() > 31 || name.contains(FORBIDDEN) {
        return Err(XlsxError::InvalidFormat(format!("invalid sheet name '{}'", name)));
    }
    Ok(())
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Escape cell text, encoding characters XML cannot carry as `_xHHHH_`
fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.char_indices() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if (c as u32) < 0x20 => out.push_str(&format!("_x{:04X}_", c as u32)),
            // A literal `_xHHHH_` must not be decoded on the way back
            '_' if looks_like_escape(&s[i..]) => out.push_str("_x005F_"),
            c => out.push(c),
        }
    }
    out
}

fn looks_like_escape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 7
        && bytes[1] == b'x'
        && bytes[2..6].iter().all(u8::is_ascii_hexdigit)
        && bytes[6] == b'_'
}

fn workbook_xml(sheet: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>
        <sheet name="{}" sheetId="1" r:id="rId1"/>
    </sheets>
</workbook>"#,
        escape_xml(sheet)
    )
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
    <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const WORKSHEET_START: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheetData>"#;

const WORKSHEET_END: &str = "\n    </sheetData>\n</worksheet>";
