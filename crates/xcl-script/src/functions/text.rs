//! Text functions

use super::int_arg;
use crate::error::{ScriptError, ScriptResult};
use crate::value::ScriptValue;
use std::fmt::Write;
use xcl_core::date;

fn non_negative(name: &str, n: i64) -> ScriptResult<usize> {
    usize::try_from(n).map_err(|_| ScriptError::Argument(format!("{} count must not be negative", name)))
}

/// UPPER(text)
pub fn fn_upper(args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
    Ok(ScriptValue::String(args[0].as_string().to_uppercase()))
}

/// LOWER(text)
pub fn fn_lower(args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
    Ok(ScriptValue::String(args[0].as_string().to_lowercase()))
}

/// TRIM(text): strips both ends and collapses inner runs of whitespace
pub fn fn_trim(args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
    let s = args[0].as_string();
    Ok(ScriptValue::String(s.split_whitespace().collect::<Vec<_>>().join(" ")))
}

/// LEN(text)
pub fn fn_len(args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
    Ok(ScriptValue::Number(args[0].as_string().chars().count() as f64))
}

/// LEFT(text, [num_chars])
pub fn fn_left(args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
    let n = non_negative("LEFT", int_arg(args, 1, 1)?)?;
    Ok(ScriptValue::String(args[0].as_string().chars().take(n).collect()))
}

/// RIGHT(text, [num_chars])
pub fn fn_right(args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
    let n = non_negative("RIGHT", int_arg(args, 1, 1)?)?;
    let s = args[0].as_string();
    let len = s.chars().count();
    Ok(ScriptValue::String(s.chars().skip(len.saturating_sub(n)).collect()))
}

/// MID(text, start, num_chars), `start` is 1-based
pub fn fn_mid(args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
    let start = int_arg(args, 1, 1)?;
    if start < 1 {
        return Err(ScriptError::Argument("MID start must be at least 1".into()));
    }
    let n = non_negative("MID", int_arg(args, 2, 0)?)?;
    let s = args[0].as_string();
    Ok(ScriptValue::String(
        s.chars().skip(start as usize - 1).take(n).collect(),
    ))
}

/// CONCAT(value, ...)
pub fn fn_concat(args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
    Ok(ScriptValue::String(args.iter().map(ScriptValue::as_string).collect()))
}

/// SUBSTITUTE(text, old, new), replaces every occurrence
pub fn fn_substitute(args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
    let text = args[0].as_string();
    let old = args[1].as_string();
    if old.is_empty() {
        return Ok(ScriptValue::String(text));
    }
    Ok(ScriptValue::String(text.replace(&old, &args[2].as_string())))
}

/// VALUE(text), converts text to a number
pub fn fn_value(args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
    match &args[0] {
        ScriptValue::Date(d) => date::datetime_to_serial(d, false)
            .map(ScriptValue::Number)
            .ok_or_else(|| ScriptError::Argument("date has no serial number".into())),
        other => other.to_number().map(ScriptValue::Number),
    }
}

/// TEXT(value, [format])
///
/// Dates take a strftime pattern (`%d/%m/%Y`). Numbers take a pattern such as
/// `0`, `0.00` or `0.0%`: the digits after the point give the decimal places
/// and a trailing `%` scales by 100.
pub fn fn_text(args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
    let Some(format) = args.get(1).map(ScriptValue::as_string) else {
        return Ok(ScriptValue::String(args[0].as_string()));
    };

    match &args[0] {
        ScriptValue::Date(d) => {
            let mut out = String::new();
            write!(out, "{}", d.format(&format))
                .map_err(|_| ScriptError::Argument(format!("invalid date format '{}'", format)))?;
            Ok(ScriptValue::String(out))
        }
        value => {
            let mut n = value.to_number()?;
            let percent = format.ends_with('%');
            if percent {
                n *= 100.0;
            }
            let decimals = format
                .split_once('.')
                .map_or(0, |(_, frac)| frac.chars().filter(|c| *c == '0' || *c == '#').count());
            let mut out = format!("{:.*}", decimals, n);
            if percent {
                out.push('%');
            }
            Ok(ScriptValue::String(out))
        }
    }
}
