//! CSV writer

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::CsvWriteOptions;
use xcl_core::{Cell, CellConsumer, Error, Result};

/// CSV cell consumer
///
/// Every cell is written as its text form. The fields of one row are buffered
/// until a cell of another row arrives or the writer is closed; dropping the
/// writer closes it.
pub struct CsvCellWriter<W: Write> {
    writer: csv::Writer<W>,
    record: Vec<String>,
    current_row: Option<u32>,
    closed: bool,
}

impl CsvCellWriter<File> {
    /// Create (or truncate) a CSV file
    pub fn create<P: AsRef<Path>>(path: P, options: &CsvWriteOptions) -> CsvResult<Self> {
        let file = File::create(path)?;
        Ok(Self::new(file, options))
    }
}

impl<W: Write> CsvCellWriter<W> {
    /// Write CSV to any writer
    pub fn new(writer: W, options: &CsvWriteOptions) -> Self {
        log::debug!("csv writer: options {:?}", options);

        let writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .terminator(options.line_terminator.to_csv())
            .flexible(true)
            .from_writer(writer);

        Self {
            writer,
            record: Vec::new(),
            current_row: None,
            closed: false,
        }
    }

    fn write_record(&mut self) -> CsvResult<()> {
        if !self.record.is_empty() {
            self.writer.write_record(&self.record)?;
            self.record.clear();
        }
        Ok(())
    }

    fn finish(&mut self) -> CsvResult<()> {
        self.write_record()?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> CellConsumer for CsvCellWriter<W> {
    fn accept(&mut self, cell: Cell) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }

        if self.current_row.map_or(false, |row| row != cell.row()) {
            self.write_record()?;
        }
        self.current_row = Some(cell.row());
        self.record.push(cell.value.to_string());
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

impl<W: Write> Drop for CsvCellWriter<W> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::error!("failed to close CSV output: {}", e);
        }
    }
}
