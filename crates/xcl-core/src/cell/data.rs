//! The cell: a typed value at an address

use super::{Address, CellError, CellType, CellValue};
use crate::date;
use crate::error::{Error, Result};

/// A typed value at an address
///
/// Cells are immutable units of data flow: transformations build new cells
/// instead of editing existing ones.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub address: Address,
    pub value: CellValue,
}

impl Cell {
    /// Create a new cell
    pub fn new(address: Address, value: impl Into<CellValue>) -> Self {
        Self {
            address,
            value: value.into(),
        }
    }

    /// Create a new cell from raw coordinates
    pub fn at(row: u32, column: u32, value: impl Into<CellValue>) -> Self {
        Self::new(Address::new(row, column), value)
    }

    /// Build a cell of a declared type from its text representation
    ///
    /// Fails with [`Error::TypeMismatch`] when the text cannot be represented
    /// as `cell_type`; nothing is silently coerced.
    ///
    /// ```
    /// use xcl_core::{Address, Cell, CellType, CellValue};
    ///
    /// let cell = Cell::typed(Address::new(0, 0), CellType::Number, "2.5").unwrap();
    /// assert_eq!(cell.value, CellValue::Number(2.5));
    ///
    /// assert!(Cell::typed(Address::new(0, 0), CellType::Number, "abc").is_err());
    /// ```
    pub fn typed(address: Address, cell_type: CellType, raw: &str) -> Result<Self> {
        let mismatch = || Error::type_mismatch(address, cell_type, format!("{:?}", raw));

        let value = match cell_type {
            CellType::Number => raw
                .trim()
                .parse::<f64>()
                .map(CellValue::Number)
                .map_err(|_| mismatch())?,
            CellType::String => CellValue::String(raw.to_string()),
            CellType::Date => date::parse_iso(raw)
                .map(CellValue::Date)
                .ok_or_else(mismatch)?,
            CellType::Formula => CellValue::formula(raw),
            CellType::Error => CellError::parse(raw)
                .map(CellValue::Error)
                .ok_or_else(mismatch)?,
            CellType::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => CellValue::Boolean(true),
                "false" => CellValue::Boolean(false),
                _ => return Err(mismatch()),
            },
            CellType::Empty if raw.is_empty() => CellValue::Empty,
            CellType::Empty => return Err(mismatch()),
        };

        Ok(Self { address, value })
    }

    /// The type tag of this cell
    pub fn cell_type(&self) -> CellType {
        self.value.cell_type()
    }

    /// Row index
    pub fn row(&self) -> u32 {
        self.address.row
    }

    /// Column index
    pub fn column(&self) -> u32 {
        self.address.column
    }

    /// A new cell at the same address with a different value
    pub fn with_value(&self, value: impl Into<CellValue>) -> Self {
        Self::new(self.address, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_typed_number() {
        let cell = Cell::typed(Address::new(1, 2), CellType::Number, " 1.5 ").unwrap();
        assert_eq!(cell.value, CellValue::Number(1.5));
        assert_eq!(cell.cell_type(), CellType::Number);
    }

    #[test]
    fn test_typed_mismatch_is_reported() {
        let err = Cell::typed(Address::new(0, 1), CellType::Number, "one").unwrap_err();
        assert!(err.is_type_mismatch());
        assert_eq!(
            err.to_string(),
            "Type mismatch at B1: expected number, got \"one\""
        );

        assert!(Cell::typed(Address::new(0, 0), CellType::Boolean, "yes").is_err());
        assert!(Cell::typed(Address::new(0, 0), CellType::Error, "#OOPS").is_err());
        assert!(Cell::typed(Address::new(0, 0), CellType::Empty, "x").is_err());
        assert!(Cell::typed(Address::new(0, 0), CellType::Date, "31/01/2024").is_err());
    }

    #[test]
    fn test_typed_other_types() {
        let a = Address::new(0, 0);
        assert_eq!(
            Cell::typed(a, CellType::Boolean, "TRUE").unwrap().value,
            CellValue::Boolean(true)
        );
        assert_eq!(
            Cell::typed(a, CellType::Error, "#N/A").unwrap().value,
            CellValue::Error(CellError::Na)
        );
        assert_eq!(
            Cell::typed(a, CellType::Formula, "=A1+1").unwrap().value,
            CellValue::Formula("A1+1".into())
        );
        assert_eq!(Cell::typed(a, CellType::Empty, "").unwrap().value, CellValue::Empty);

        let expected = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(13, 30, 0)
            .unwrap();
        assert_eq!(
            Cell::typed(a, CellType::Date, "2024-02-29T13:30:00").unwrap().value,
            CellValue::Date(expected)
        );
    }

    #[test]
    fn test_with_value_keeps_address() {
        let cell = Cell::at(3, 4, "x");
        let other = cell.with_value(10.0);
        assert_eq!(other.address, cell.address);
        assert_eq!(other.value, CellValue::Number(10.0));
        assert_eq!(cell.value, CellValue::string("x"));
    }
}
