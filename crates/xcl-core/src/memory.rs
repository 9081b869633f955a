//! In-memory producer and consumer
//!
//! Useful for tests and for feeding already-materialized data through the
//! same pipeline as the file codecs.

use crate::cell::{Address, Cell, CellValue, Window};
use crate::error::{Error, Result};
use crate::stream::{CellConsumer, CellProducer};
use std::vec;

/// Produces cells from a grid of values, applying a [`Window`]
#[derive(Debug)]
pub struct MemoryProducer {
    rows: vec::IntoIter<Vec<CellValue>>,
    current: Option<(u32, vec::IntoIter<CellValue>)>,
    next_row: u32,
    column: u32,
    window: Window,
}

impl MemoryProducer {
    /// Create a producer over `rows`, row 0 first
    pub fn new(rows: Vec<Vec<CellValue>>, window: Window) -> Self {
        Self {
            rows: rows.into_iter(),
            current: None,
            next_row: 0,
            column: 0,
            window,
        }
    }

    fn advance_row(&mut self) -> bool {
        loop {
            let Some(values) = self.rows.next() else {
                return false;
            };
            let row = self.next_row;
            self.next_row += 1;

            if self.window.is_past(row) {
                return false;
            }
            if self.window.row_in_range(row) {
                self.current = Some((row, values.into_iter()));
                self.column = 0;
                return true;
            }
        }
    }
}

impl Iterator for MemoryProducer {
    type Item = Result<Cell>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((row, values)) = self.current.as_mut() {
                let row = *row;
                while let Some(value) = values.next() {
                    let column = self.column;
                    self.column += 1;
                    if self.window.is_past_column(column) {
                        break;
                    }
                    if self.window.column_in_range(column) {
                        return Some(Ok(Cell::new(Address::new(row, column), value)));
                    }
                }
                self.current = None;
            }
            if !self.advance_row() {
                return None;
            }
        }
    }
}

impl CellProducer for MemoryProducer {}

/// Collects cells into records, one record per source row
#[derive(Debug, Default)]
pub struct MemoryConsumer {
    records: Vec<Vec<Cell>>,
    pending: Vec<Cell>,
    closed: bool,
}

impl MemoryConsumer {
    /// Create an empty consumer
    pub fn new() -> Self {
        Self::default()
    }

    /// Records flushed so far
    ///
    /// The last record only appears after [`CellConsumer::close`].
    pub fn records(&self) -> &[Vec<Cell>] {
        &self.records
    }

    /// Records as displayed strings
    pub fn rows_as_strings(&self) -> Vec<Vec<String>> {
        self.records
            .iter()
            .map(|r| r.iter().map(|c| c.value.to_string()).collect())
            .collect()
    }

    /// Whether the consumer has been closed
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            self.records.push(std::mem::take(&mut self.pending));
        }
    }
}

impl CellConsumer for MemoryConsumer {
    fn accept(&mut self, cell: Cell) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        if let Some(last) = self.pending.last() {
            if last.row() != cell.row() {
                self.flush();
            }
        }
        self.pending.push(cell);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.flush();
            self.closed = true;
        }
        Ok(())
    }
}
