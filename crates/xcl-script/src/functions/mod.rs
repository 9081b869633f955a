//! Built-in functions
//!
//! `IF` is evaluated by the interpreter itself so only the taken branch runs;
//! everything else receives its arguments already evaluated.

pub mod date;
pub mod logical;
pub mod math;
pub mod text;

use crate::error::{ScriptError, ScriptResult};
use crate::value::ScriptValue;
use ahash::AHashMap;
use std::sync::OnceLock;

/// Function implementation signature
pub type FunctionImpl = fn(&[ScriptValue]) -> ScriptResult<ScriptValue>;

/// Function definition
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: FunctionImpl,
}

/// Function registry
pub struct FunctionRegistry {
    functions: AHashMap<&'static str, FunctionDef>,
}

static FUNCTION_REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

/// The registry of built-in functions
pub fn registry() -> &'static FunctionRegistry {
    FUNCTION_REGISTRY.get_or_init(FunctionRegistry::new)
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: AHashMap::new(),
        };

        registry.register_math_functions();
        registry.register_logical_functions();
        registry.register_text_functions();
        registry.register_date_functions();

        registry
    }

    /// Look up a function by uppercase name
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name)
    }

    /// Register a function
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name, def);
    }

    fn add(&mut self, name: &'static str, min: usize, max: Option<usize>, f: FunctionImpl) {
        self.register(FunctionDef {
            name,
            min_args: min,
            max_args: max,
            implementation: f,
        });
    }

    fn register_math_functions(&mut self) {
        self.add("ABS", 1, Some(1), math::fn_abs);
        self.add("ROUND", 1, Some(2), math::fn_round);
        self.add("INT", 1, Some(1), math::fn_int);
        self.add("MIN", 1, None, math::fn_min);
        self.add("MAX", 1, None, math::fn_max);
        self.add("SUM", 0, None, math::fn_sum);
    }

    fn register_logical_functions(&mut self) {
        self.add("AND", 1, None, logical::fn_and);
        self.add("OR", 1, None, logical::fn_or);
        self.add("NOT", 1, Some(1), logical::fn_not);
    }

    fn register_text_functions(&mut self) {
        self.add("UPPER", 1, Some(1), text::fn_upper);
        self.add("LOWER", 1, Some(1), text::fn_lower);
        self.add("TRIM", 1, Some(1), text::fn_trim);
        self.add("LEN", 1, Some(1), text::fn_len);
        self.add("LEFT", 1, Some(2), text::fn_left);
        self.add("RIGHT", 1, Some(2), text::fn_right);
        self.add("MID", 3, Some(3), text::fn_mid);
        self.add("CONCAT", 0, None, text::fn_concat);
        self.add("SUBSTITUTE", 3, Some(3), text::fn_substitute);
        self.add("REPLACE", 3, Some(3), text::fn_substitute);
        self.add("VALUE", 1, Some(1), text::fn_value);
        self.add("NUMBER", 1, Some(1), text::fn_value);
        self.add("TEXT", 1, Some(2), text::fn_text);
    }

    fn register_date_functions(&mut self) {
        self.add("DATE", 3, Some(3), date::fn_date);
        self.add("YEAR", 1, Some(1), date::fn_year);
        self.add("MONTH", 1, Some(1), date::fn_month);
        self.add("DAY", 1, Some(1), date::fn_day);
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Check a call's argument count against a function's bounds
pub fn check_arity(
    name: &str,
    min: usize,
    max: Option<usize>,
    actual: usize,
) -> ScriptResult<()> {
    if actual < min {
        return Err(ScriptError::ArgumentCount {
            function: name.to_string(),
            expected: format!("at least {}", min),
            actual,
        });
    }

    if let Some(max) = max {
        if actual > max {
            return Err(ScriptError::ArgumentCount {
                function: name.to_string(),
                expected: format!("at most {}", max),
                actual,
            });
        }
    }

    Ok(())
}

/// Integer argument, truncated toward zero
pub(crate) fn int_arg(args: &[ScriptValue], index: usize, default: i64) -> ScriptResult<i64> {
    match args.get(index) {
        None => Ok(default),
        Some(v) => Ok(v.to_number()?.trunc() as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let registry = registry();
        assert!(registry.get("SUM").is_some());
        assert!(registry.get("SUBSTITUTE").is_some());
        assert!(registry.get("IF").is_none());
        assert!(registry.get("sum").is_none());
    }

    #[test]
    fn test_check_arity() {
        assert!(check_arity("MID", 3, Some(3), 3).is_ok());
        assert_eq!(
            check_arity("MID", 3, Some(3), 2).unwrap_err().to_string(),
            "Wrong number of arguments for MID: expected at least 3, got 2"
        );
        assert!(check_arity("SUM", 0, None, 50).is_ok());
    }
}
