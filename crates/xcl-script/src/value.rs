//! Runtime values

use crate::error::{ScriptError, ScriptResult};
use chrono::NaiveDateTime;
use std::fmt;
use xcl_core::{date, CellValue};

/// A value produced or stored by the interpreter
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScriptValue {
    #[default]
    Null,
    Number(f64),
    String(String),
    Boolean(bool),
    Date(NaiveDateTime),
}

impl ScriptValue {
    /// Name of the value's type, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ScriptValue::Null => "null",
            ScriptValue::Number(_) => "number",
            ScriptValue::String(_) => "string",
            ScriptValue::Boolean(_) => "boolean",
            ScriptValue::Date(_) => "date",
        }
    }

    /// Numeric view for arithmetic
    ///
    /// Booleans count as 0/1 and null as 0. Strings convert only when they
    /// hold a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ScriptValue::Number(n) => Some(*n),
            ScriptValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            ScriptValue::Null => Some(0.0),
            ScriptValue::String(s) => s.trim().parse().ok(),
            ScriptValue::Date(_) => None,
        }
    }

    /// Numeric view, failing with a type error
    pub fn to_number(&self) -> ScriptResult<f64> {
        self.as_number().ok_or_else(|| {
            ScriptError::type_error(format!("expected number, got {} {}", self.type_name(), self))
        })
    }

    /// Truthiness for conditions and logical operators
    pub fn is_truthy(&self) -> bool {
        match self {
            ScriptValue::Null => false,
            ScriptValue::Number(n) => *n != 0.0 && !n.is_nan(),
            ScriptValue::String(s) => !s.is_empty(),
            ScriptValue::Boolean(b) => *b,
            ScriptValue::Date(_) => true,
        }
    }

    /// Text view used by concatenation and text functions
    pub fn as_string(&self) -> String {
        self.to_string()
    }

    /// Date view; ISO strings are accepted
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            ScriptValue::Date(d) => Some(*d),
            ScriptValue::String(s) => date::parse_iso(s),
            _ => None,
        }
    }

    /// Convert to a cell value using the output typing rule
    ///
    /// Booleans, numbers and dates keep their type; everything else becomes
    /// text.
    pub fn into_cell_value(self) -> CellValue {
        match self {
            ScriptValue::Boolean(b) => CellValue::Boolean(b),
            ScriptValue::Number(n) => CellValue::Number(n),
            ScriptValue::Date(d) => CellValue::Date(d),
            ScriptValue::String(s) => CellValue::String(s),
            ScriptValue::Null => CellValue::String(String::new()),
        }
    }
}

impl fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptValue::Null => Ok(()),
            ScriptValue::Number(n) => write!(f, "{}", n),
            ScriptValue::String(s) => f.write_str(s),
            ScriptValue::Boolean(b) => write!(f, "{}", b),
            ScriptValue::Date(d) => f.write_str(&date::format_iso(d)),
        }
    }
}

impl From<CellValue> for ScriptValue {
    fn from(value: CellValue) -> Self {
        match value {
            CellValue::Number(n) => ScriptValue::Number(n),
            CellValue::String(s) | CellValue::Formula(s) => ScriptValue::String(s),
            CellValue::Date(d) => ScriptValue::Date(d),
            CellValue::Error(e) => ScriptValue::String(e.to_string()),
            CellValue::Boolean(b) => ScriptValue::Boolean(b),
            CellValue::Empty => ScriptValue::Null,
        }
    }
}

impl From<f64> for ScriptValue {
    fn from(n: f64) -> Self {
        ScriptValue::Number(n)
    }
}

impl From<bool> for ScriptValue {
    fn from(b: bool) -> Self {
        ScriptValue::Boolean(b)
    }
}

impl From<&str> for ScriptValue {
    fn from(s: &str) -> Self {
        ScriptValue::String(s.to_string())
    }
}

impl From<String> for ScriptValue {
    fn from(s: String) -> Self {
        ScriptValue::String(s)
    }
}
