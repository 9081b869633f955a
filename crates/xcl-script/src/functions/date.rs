//! Date functions

use super::int_arg;
use crate::error::{ScriptError, ScriptResult};
use crate::value::ScriptValue;
use chrono::{Datelike, NaiveDate, NaiveDateTime};

fn datetime_arg(name: &str, value: &ScriptValue) -> ScriptResult<NaiveDateTime> {
    value.as_datetime().ok_or_else(|| {
        ScriptError::Type(format!("{} expects a date, got {} {}", name, value.type_name(), value))
    })
}

/// DATE(year, month, day)
pub fn fn_date(args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
    let year = int_arg(args, 0, 0)?;
    let month = int_arg(args, 1, 1)?;
    let day = int_arg(args, 2, 1)?;

    i32::try_from(year)
        .ok()
        .zip(u32::try_from(month).ok())
        .zip(u32::try_from(day).ok())
        .and_then(|((y, m), d)| NaiveDate::from_ymd_opt(y, m, d))
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(ScriptValue::Date)
        .ok_or_else(|| {
            ScriptError::Argument(format!("invalid date {}-{}-{}", year, month, day))
        })
}

/// YEAR(date)
pub fn fn_year(args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
    Ok(ScriptValue::Number(datetime_arg("YEAR", &args[0])?.year() as f64))
}

/// MONTH(date)
pub fn fn_month(args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
    Ok(ScriptValue::Number(datetime_arg("MONTH", &args[0])?.month() as f64))
}

/// DAY(date)
pub fn fn_day(args: &[ScriptValue]) -> ScriptResult<ScriptValue> {
    Ok(ScriptValue::Number(datetime_arg("DAY", &args[0])?.day() as f64))
}
