//! # xcl
//!
//! Streaming conversion between CSV and XLSX with optional per-column
//! expressions.
//!
//! A conversion is a pipeline of three parts:
//! - a [`CellProducer`] that reads cells row by row from a source, already
//!   restricted to a [`Window`]
//! - a [`Transformer`] that computes output columns from the current row
//! - a [`CellConsumer`] that groups cells back into records
//!
//! Only the current row is ever held in memory.
//!
//! ## Example
//!
//! ```rust
//! use xcl::prelude::*;
//!
//! let rows = vec![
//!     vec![CellValue::from("A"), CellValue::from("B"), CellValue::from("C")],
//!     vec![CellValue::from("teste1"), CellValue::from(1.1), CellValue::from(true)],
//! ];
//! let mut out = Vec::new();
//! let writer = CsvCellWriter::new(&mut out, &CsvWriteOptions::default());
//!
//! run(MemoryProducer::new(rows, Window::all()), writer, &["$0", "$1 + $1", "$2"]).unwrap();
//!
//! assert_eq!(String::from_utf8(out).unwrap(), "A,BB,C\r\nteste1,2.2,true\r\n");
//! ```

pub mod convert;
pub mod error;
pub mod pipeline;
pub mod prelude;
pub mod transform;

pub use convert::{convert, Format, Location, Sink, Source};
pub use error::{XclError, XclResult};
pub use pipeline::{run, run_with, RunStats};
pub use transform::{ColumnExpression, RowBindings, Transformer};

// Re-export core types
pub use xcl_core::{
    Address, Cell, CellConsumer, CellError, CellProducer, CellType, CellValue, MemoryConsumer,
    MemoryProducer, Window,
};

// Re-export the expression language
pub use xcl_script::{Interpreter, ScriptEngine, ScriptError, ScriptValue};

// Re-export I/O types
pub use xcl_csv::{CsvCellReader, CsvCellWriter, CsvError, CsvReadOptions, CsvWriteOptions, LineTerminator};
pub use xcl_xlsx::{XlsxCellReader, XlsxCellWriter, XlsxError, XlsxReadOptions, XlsxWriteOptions};
