//! Logical functions

use crate::error::ScriptResult;
use crate::value::ScriptValue;

/// AND(value, ...)
pub fn fn_and(args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
    Ok(ScriptValue::Boolean(args.iter().all(ScriptValue::is_truthy)))
}

/// OR(value, ...)
pub fn fn_or(args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
    Ok(ScriptValue::Boolean(args.iter().any(ScriptValue::is_truthy)))
}

/// NOT(value)
pub fn fn_not(args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
    Ok(ScriptValue::Boolean(!args[0].is_truthy()))
}

#[cfg(test)]
mod tests {
    use crate::{Interpreter, ScriptEngine, ScriptValue};

    #[test]
    fn test_logical_functions() {
        let mut engine = Interpreter::new();
        let t = ScriptValue::Boolean(true);
        let f = ScriptValue::Boolean(false);
        assert_eq!(engine.eval("AND(true, 1, \"x\")").unwrap(), t);
        assert_eq!(engine.eval("AND(true, 0)").unwrap(), f);
        assert_eq!(engine.eval("OR(false, null, 2)").unwrap(), t);
        assert_eq!(engine.eval("NOT(\"\")").unwrap(), t);
    }
}
