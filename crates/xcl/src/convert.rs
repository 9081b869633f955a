//! Codec selection for whole conversions
//!
//! A [`Source`] or [`Sink`] names a file (or the standard streams) and a
//! format. [`convert`] opens both, runs the pipeline and releases them.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use xcl_core::{CellProducer, Window};
use xcl_csv::{CsvCellReader, CsvCellWriter, CsvReadOptions, CsvWriteOptions};
use xcl_xlsx::{XlsxCellReader, XlsxCellWriter, XlsxReadOptions, XlsxWriteOptions};

use crate::error::{XclError, XclResult};
use crate::pipeline::{run, RunStats};

/// A tabular file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Delimited text
    Csv,
    /// Office Open XML workbook
    Xlsx,
}

impl Format {
    /// Guess the format from a file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> XclResult<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("xlsx") | Some("xlsm") => Ok(Format::Xlsx),
            Some("csv") | Some("txt") => Ok(Format::Csv),
            _ => Err(XclError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Where data is read from or written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A file on disk
    Path(PathBuf),
    /// Standard input for sources, standard output for sinks
    Stdio,
}

impl Location {
    /// `None` and `-` mean the standard streams
    pub fn from_arg(path: Option<PathBuf>) -> Self {
        match path {
            Some(p) if p.as_os_str() != "-" => Location::Path(p),
            _ => Location::Stdio,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Path(path) => write!(f, "{}", path.display()),
            Location::Stdio => f.write_str("-"),
        }
    }
}

/// Input side of a conversion
#[derive(Debug, Clone)]
pub struct Source {
    pub location: Location,
    pub format: Format,
    pub window: Window,
    pub csv: CsvReadOptions,
    pub xlsx: XlsxReadOptions,
}

impl Source {
    /// A source with default codec options and no window
    pub fn new(location: Location, format: Format) -> Self {
        Self {
            location,
            format,
            window: Window::all(),
            csv: CsvReadOptions::default(),
            xlsx: XlsxReadOptions::default(),
        }
    }

    /// Open the source as a cell producer
    pub fn open(&self) -> XclResult<Box<dyn CellProducer>> {
        let producer: Box<dyn CellProducer> = match (&self.location, self.format) {
            (Location::Path(path), Format::Csv) => {
                Box::new(CsvCellReader::new(BufReader::new(File::open(path)?), self.window, &self.csv))
            }
            (Location::Stdio, Format::Csv) => {
                Box::new(CsvCellReader::new(io::stdin(), self.window, &self.csv))
            }
            (Location::Path(path), Format::Xlsx) => {
                Box::new(XlsxCellReader::open(path, self.window, &self.xlsx)?)
            }
            (Location::Stdio, Format::Xlsx) => {
                // The package needs random access
                let mut bytes = Vec::new();
                io::stdin().lock().read_to_end(&mut bytes)?;
                Box::new(XlsxCellReader::new(Cursor::new(bytes), self.window, &self.xlsx)?)
            }
        };
        Ok(producer)
    }
}

/// Output side of a conversion
#[derive(Debug, Clone)]
pub struct Sink {
    pub location: Location,
    pub format: Format,
    pub csv: CsvWriteOptions,
    pub xlsx: XlsxWriteOptions,
}

impl Sink {
    /// A sink with default codec options
    pub fn new(location: Location, format: Format) -> Self {
        Self {
            location,
            format,
            csv: CsvWriteOptions::default(),
            xlsx: XlsxWriteOptions::default(),
        }
    }
}

/// Convert `source` into `sink`, applying `expressions`
pub fn convert<S: AsRef<str>>(source: &Source, sink: &Sink, expressions: &[S]) -> XclResult<RunStats> {
    log::debug!("convert: {} ({:?}) -> {} ({:?})", source.location, source.format, sink.location, sink.format);
    let producer = source.open()?;

    match (&sink.location, sink.format) {
        (Location::Path(path), Format::Csv) => {
            let writer = CsvCellWriter::new(BufWriter::new(File::create(path)?), &sink.csv);
            run(producer, writer, expressions)
        }
        (Location::Stdio, Format::Csv) => {
            let writer = CsvCellWriter::new(io::stdout().lock(), &sink.csv);
            run(producer, writer, expressions)
        }
        (Location::Path(path), Format::Xlsx) => {
            let writer = XlsxCellWriter::create(path, &sink.xlsx)?;
            run(producer, writer, expressions)
        }
        (Location::Stdio, Format::Xlsx) => {
            // The package needs random access; build it in memory first
            let mut writer = XlsxCellWriter::new(Cursor::new(Vec::new()), &sink.xlsx)?;
            let stats = run(producer, &mut writer, expressions)?;
            let bytes = writer.into_inner()?.into_inner();

            let mut stdout = io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
            Ok(stats)
        }
    }
}
