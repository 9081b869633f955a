//! XLSX options

/// Options for reading XLSX
#[derive(Debug, Clone, Default)]
pub struct XlsxReadOptions {
    /// Sheet to read; the first sheet of the workbook when `None`
    pub sheet: Option<String>,
}

impl XlsxReadOptions {
    /// Read the sheet called `name`
    pub fn sheet<S: Into<String>>(name: S) -> Self {
        Self {
            sheet: Some(name.into()),
        }
    }
}

/// Options for writing XLSX
#[derive(Debug, Clone)]
pub struct XlsxWriteOptions {
    /// Name of the written sheet (default: `tab1`)
    pub sheet: String,
}

impl Default for XlsxWriteOptions {
    fn default() -> Self {
        Self {
            sheet: "tab1".to_string(),
        }
    }
}

impl XlsxWriteOptions {
    /// Write a sheet called `name`
    pub fn sheet<S: Into<String>>(name: S) -> Self {
        Self { sheet: name.into() }
    }
}
