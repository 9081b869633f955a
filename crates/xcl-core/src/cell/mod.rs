//! Cell-related types
//!
//! This module contains:
//! - [`Address`] - A cell's location, zero-based
//! - [`Window`] - An inclusive address rectangle used to filter producers
//! - [`CellValue`] / [`CellType`] - The typed payload of a cell
//! - [`Cell`] - A value at an address

mod address;
mod data;
mod value;

pub use address::{Address, Window};
pub use data::Cell;
pub use value::{CellError, CellType, CellValue};
