//! # xcl-csv
//!
//! Delimited-text cell producer and consumer for xcl.
//!
//! [`CsvCellReader`] yields one [`Cell`](xcl_core::Cell) per field, row-major,
//! already filtered by a [`Window`](xcl_core::Window). [`CsvCellWriter`]
//! buffers one row of cells and writes a record whenever the row changes.

mod error;
mod options;
mod reader;
mod writer;

pub use error::{CsvError, CsvResult};
pub use options::{CsvReadOptions, CsvWriteOptions, LineTerminator};
pub use reader::CsvCellReader;
pub use writer::CsvCellWriter;
