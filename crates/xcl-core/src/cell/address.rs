//! Cell address and window types

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A cell address, zero-based on both axes
///
/// Addresses order row-major: row ascending, then column ascending. External
/// notations ("B2", "R2C2") are 1-based and only appear at the parsing boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Address {
    /// Row index (0-based)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ...)
    pub column: u32,
}

impl Address {
    /// Create a new address
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Parse an address from A1-style notation (`$` markers are accepted and ignored)
    ///
    /// # Examples
    /// ```
    /// use xcl_core::Address;
    ///
    /// let addr = Address::parse_a1("C10").unwrap();
    /// assert_eq!(addr, Address::new(9, 2));
    ///
    /// let addr = Address::parse_a1("$B$2").unwrap();
    /// assert_eq!(addr, Address::new(1, 1));
    /// ```
    pub fn parse_a1(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let cleaned: String = s.chars().filter(|&c| c != '$').collect();
        let split = cleaned
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(cleaned.len());

        if split == 0 {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }

        let column = Self::letters_to_column(&cleaned[..split])?;

        let row_str = &cleaned[split..];
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }

        let row = Self::parse_one_based(row_str, s)?;
        if row >= MAX_ROWS {
            return Err(Error::InvalidAddress(format!(
                "row {} out of bounds in '{}'",
                row + 1,
                s
            )));
        }

        Ok(Self { row, column })
    }

    /// Parse an address from R1C1-style notation (case-insensitive, 1-based)
    ///
    /// # Examples
    /// ```
    /// use xcl_core::Address;
    ///
    /// assert_eq!(Address::parse_r1c1("R1C1").unwrap(), Address::new(0, 0));
    /// assert_eq!(Address::parse_r1c1("r4c3").unwrap(), Address::new(3, 2));
    /// assert!(Address::parse_r1c1("R0C1").is_err());
    /// ```
    pub fn parse_r1c1(s: &str) -> Result<Self> {
        let s = s.trim();
        let upper = s.to_ascii_uppercase();

        let rest = upper
            .strip_prefix('R')
            .ok_or_else(|| Error::InvalidAddress(format!("expected 'R' in '{}'", s)))?;
        let (row_str, col_str) = rest
            .split_once('C')
            .ok_or_else(|| Error::InvalidAddress(format!("expected 'C' in '{}'", s)))?;

        let row = Self::parse_one_based(row_str, s)?;
        let column = Self::parse_one_based(col_str, s)?;

        Ok(Self { row, column })
    }

    /// Leniently parse a window bound literal
    ///
    /// Accepts R1C1 or A1 notation. An empty or malformed literal yields `None`,
    /// meaning "no bound on this side" rather than a zero coordinate.
    pub fn parse_bound(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        Self::parse_r1c1(s).or_else(|_| Self::parse_a1(s)).ok()
    }

    fn parse_one_based(digits: &str, original: &str) -> Result<u32> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidAddress(format!(
                "invalid number in '{}'",
                original
            )));
        }
        let n: u32 = digits
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("number too large in '{}'", original)))?;
        if n == 0 {
            return Err(Error::InvalidAddress(format!(
                "indices are 1-based in '{}'",
                original
            )));
        }
        Ok(n - 1)
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(column: u32) -> String {
        let mut result = String::new();
        let mut n = column as u64 + 1;

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_column(letters: &str) -> Result<u32> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            col = col
                .checked_mul(26)
                .and_then(|v| v.checked_add(c.to_ascii_uppercase() as u32 - 'A' as u32 + 1))
                .ok_or_else(|| Error::InvalidAddress(format!("column '{}' too large", letters)))?;
        }

        let col = col - 1;
        if col >= MAX_COLS {
            return Err(Error::InvalidAddress(format!(
                "column '{}' out of bounds",
                letters
            )));
        }

        Ok(col)
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.column), self.row + 1)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_r1c1(s).or_else(|_| Self::parse_a1(s))
    }
}

impl From<(u32, u32)> for Address {
    fn from((row, column): (u32, u32)) -> Self {
        Self::new(row, column)
    }
}

/// An inclusive rectangle of source coordinates
///
/// A producer applies the window before it materializes a cell. `end = None`
/// leaves both axes unbounded above. With `remove_header_row`, the row at
/// `start.row` is excluded as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Window {
    /// Top-left corner (inclusive)
    pub start: Address,
    /// Bottom-right corner (inclusive), `None` for unbounded
    pub end: Option<Address>,
    /// Whether to drop the first row of the window
    pub remove_header_row: bool,
}

impl Window {
    /// A window covering the whole source
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a window from explicit bounds
    pub fn new(start: Address, end: Option<Address>) -> Self {
        Self {
            start,
            end,
            remove_header_row: false,
        }
    }

    /// Build a window from external notation literals
    ///
    /// Malformed or empty literals are treated as "no bound".
    ///
    /// ```
    /// use xcl_core::{Address, Window};
    ///
    /// let w = Window::from_literals("R2C1", "not-an-address", false);
    /// assert_eq!(w.start, Address::new(1, 0));
    /// assert_eq!(w.end, None);
    /// ```
    pub fn from_literals(start: &str, end: &str, remove_header_row: bool) -> Self {
        Self {
            start: Address::parse_bound(start).unwrap_or_default(),
            end: Address::parse_bound(end),
            remove_header_row,
        }
    }

    /// Set header removal
    pub fn with_header_removed(mut self, remove: bool) -> Self {
        self.remove_header_row = remove;
        self
    }

    /// Whether `address` falls inside the window
    pub fn contains(&self, address: &Address) -> bool {
        self.row_in_range(address.row) && self.column_in_range(address.column)
    }

    /// Whether any cell of `row` can be inside the window
    pub fn row_in_range(&self, row: u32) -> bool {
        if row < self.start.row || self.is_past(row) {
            return false;
        }
        !(self.remove_header_row && row == self.start.row)
    }

    /// Whether `column` is inside the window's column span
    pub fn column_in_range(&self, column: u32) -> bool {
        column >= self.start.column && self.end.map_or(true, |end| column <= end.column)
    }

    /// Whether `row` (and therefore every later row) is beyond the window
    pub fn is_past(&self, row: u32) -> bool {
        self.end.map_or(false, |end| row > end.row)
    }

    /// Whether `column` (and every later column of the same row) is beyond the window
    pub fn is_past_column(&self, column: u32) -> bool {
        self.end.map_or(false, |end| column > end.column)
    }
}
