//! Math functions

use super::int_arg;
use crate::error::{ScriptError, ScriptResult};
use crate::value::ScriptValue;

fn numbers(args: &[ScriptValue]) -> ScriptResult<Vec<f64>> {
    args.iter().map(ScriptValue::to_number).collect()
}

/// ABS(number)
pub fn fn_abs(args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
    Ok(ScriptValue::Number(args[0].to_number()?.abs()))
}

/// ROUND(number, [digits]), halves away from zero
pub fn fn_round(args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
    let n = args[0].to_number()?;
    let digits = int_arg(args, 1, 0)?;
    if !(-15..=15).contains(&digits) {
        return Err(ScriptError::Argument(format!("ROUND digits out of range: {}", digits)));
    }
    let factor = 10f64.powi(digits.unsigned_abs() as i32);
    let rounded = if digits >= 0 {
        (n * factor).round() / factor
    } else {
        (n / factor).round() * factor
    };
    Ok(ScriptValue::Number(rounded))
}

/// INT(number), rounds down
pub fn fn_int(args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
    Ok(ScriptValue::Number(args[0].to_number()?.floor()))
}

/// MIN(number, ...)
pub fn fn_min(args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
    let min = numbers(args)?.into_iter().fold(f64::INFINITY, f64::min);
    Ok(ScriptValue::Number(min))
}

/// MAX(number, ...)
pub fn fn_max(args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
    let max = numbers(args)?.into_iter().fold(f64::NEG_INFINITY, f64::max);
    Ok(ScriptValue::Number(max))
}

/// SUM(number, ...)
pub fn fn_sum(args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
    Ok(ScriptValue::Number(numbers(args)?.into_iter().sum()))
}
