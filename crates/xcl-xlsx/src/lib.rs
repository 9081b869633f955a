//! # xcl-xlsx
//!
//! Office Open XML spreadsheet support for xcl.
//!
//! [`XlsxCellReader`] decodes one worksheet lazily, cell by cell, and skips
//! everything outside its [`Window`](xcl_core::Window) without building cells.
//! [`XlsxCellWriter`] streams cells into a single-sheet workbook and finishes
//! the package when it is closed.

mod error;
mod options;
mod reader;
mod styles;
mod writer;

pub use error::{XlsxError, XlsxResult};
pub use options::{XlsxReadOptions, XlsxWriteOptions};
pub use reader::XlsxCellReader;
pub use writer::XlsxCellWriter;
