//! XLSX styles (styles.xml) read/write helpers
//!
//! Only number formats matter to the cell stream: a numeric cell whose style
//! carries a date format is read back as a date.

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};

/// cellXfs index of the date-only style written by [`STYLES_XML`]
pub(crate) const DATE_STYLE: u32 = 1;

/// cellXfs index of the date-time style written by [`STYLES_XML`]
pub(crate) const DATETIME_STYLE: u32 = 2;

/// Stylesheet written into every generated workbook
pub(crate) const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="2">
    <numFmt numFmtId="164" formatCode="yyyy\-mm\-dd"/>
    <numFmt numFmtId="165" formatCode="yyyy\-mm\-dd\ hh:mm:ss"/>
  </numFmts>
  <fonts count="1">
    <font><sz val="11"/><name val="Calibri"/><family val="2"/></font>
  </fonts>
  <fills count="2">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
  </fills>
  <borders count="1">
    <border><left/><right/><top/><bottom/><diagonal/></border>
  </borders>
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>
  <cellXfs count="3">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="164" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
    <xf numFmtId="165" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
  </cellXfs>
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
</styleSheet>"#;

/// Whether a number format displays a date or time
///
/// Built-in ids 14-22 and 45-47 are the date and time formats. A custom code
/// is a date when, outside of colors, quoted literals and escapes, it uses a
/// date or time placeholder.
pub(crate) fn is_date_format(id: u32, custom: Option<&str>) -> bool {
    if let Some(code) = custom {
        return is_date_code(code);
    }
    matches!(id, 14..=22 | 45..=47)
}

fn is_date_code(code: &str) -> bool {
    // Only the first (positive) section decides
    let section = code.split(';').next().unwrap_or_default();

    let mut chars = section.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                for q in chars.by_ref() {
                    if q == '"' {
                        break;
                    }
                }
            }
            '[' => {
                let mut inner = String::new();
                for b in chars.by_ref() {
                    if b == ']' {
                        break;
                    }
                    inner.push(b);
                }
                // Elapsed time: [h], [mm], [ss]
                if inner.chars().all(|c| matches!(c.to_ascii_lowercase(), 'h' | 'm' | 's'))
                    && !inner.is_empty()
                {
                    return true;
                }
            }
            '\\' | '_' | '*' => {
                chars.next();
            }
            c if matches!(c.to_ascii_lowercase(), 'y' | 'm' | 'd' | 'h' | 's') => return true,
            _ => {}
        }
    }
    false
}

fn attr_u32(e: &BytesStart, key: &[u8]) -> Option<u32> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().and_then(|v| v.parse().ok()))
}

/// Read styles.xml into a table indexed by cellXfs id: `true` for date styles
pub(crate) fn read_date_styles<R: Read>(reader: R) -> XlsxResult<Vec<bool>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut numfmts: HashMap<u32, String> = HashMap::new();
    let mut date_styles = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"numFmt" => {
                    let id = attr_u32(&e, b"numFmtId");
                    let code = e
                        .attributes()
                        .flatten()
                        .find(|attr| attr.key.as_ref() == b"formatCode")
                        .and_then(|attr| attr.unescape_value().ok().map(|s| s.to_string()));
                    if let (Some(id), Some(code)) = (id, code) {
                        numfmts.insert(id, code);
                    }
                }
                b"cellXfs" => {
                    in_cell_xfs = true;
                }
                b"xf" if in_cell_xfs => {
                    let id = attr_u32(&e, b"numFmtId").unwrap_or(0);
                    date_styles.push(is_date_format(id, numfmts.get(&id).map(String::as_str)));
                }
                _ => {}
            },
            Ok(Event::End(e)) if e.name().as_ref() == b"cellXfs" => {
                in_cell_xfs = false;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(date_styles)
}
