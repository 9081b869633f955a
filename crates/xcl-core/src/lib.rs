//! # xcl-core
//!
//! Core data model for the xcl cell stream.
//!
//! Every tabular format xcl understands is reduced to the same vocabulary:
//! - [`Address`] - a zero-based (row, column) coordinate, ordered row-major
//! - [`Window`] - an inclusive rectangle of addresses plus header exclusion
//! - [`CellValue`] / [`CellType`] - a closed set of typed payloads
//! - [`Cell`] - a typed value at an address
//! - [`CellProducer`] / [`CellConsumer`] - the streaming contracts codecs implement
//!
//! ## Example
//!
//! ```rust
//! use xcl_core::{Address, Cell, CellConsumer, CellValue, MemoryConsumer, MemoryProducer, Window};
//!
//! let rows = vec![
//!     vec![CellValue::from("A"), CellValue::from("B")],
//!     vec![CellValue::from("x"), CellValue::from(1.5)],
//! ];
//! let window = Window::all().with_header_removed(true);
//! let cells: Vec<Cell> = MemoryProducer::new(rows, window)
//!     .collect::<xcl_core::Result<_>>()
//!     .unwrap();
//!
//! assert_eq!(cells.len(), 2);
//! assert_eq!(cells[0].address, Address::new(1, 0));
//!
//! let mut sink = MemoryConsumer::new();
//! for cell in cells {
//!     sink.accept(cell).unwrap();
//! }
//! sink.close().unwrap();
//! assert_eq!(sink.records().len(), 1);
//! ```

pub mod cell;
pub mod date;
pub mod error;
pub mod memory;
pub mod stream;

pub use cell::{Address, Cell, CellError, CellType, CellValue, Window};
pub use error::{Error, Result};
pub use memory::{MemoryConsumer, MemoryProducer};
pub use stream::{CellConsumer, CellProducer};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u32 = 16_384;
