//! Statement interpreter

use crate::ast::{BinaryOperator, Expr, Statement, UnaryOperator};
use crate::engine::ScriptEngine;
use crate::error::{ScriptError, ScriptResult};
use crate::functions::{self, check_arity};
use crate::parser::parse_statement;
use crate::value::ScriptValue;
use ahash::AHashMap;
use chrono::{Duration, NaiveDateTime};
use std::cmp::Ordering;
use std::sync::Arc;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Tree-walking interpreter with a variable store
///
/// Parsed statements are cached by source text, so evaluating the same
/// statement once per row only parses it once.
#[derive(Debug, Default)]
pub struct Interpreter {
    variables: AHashMap<String, ScriptValue>,
    statements: AHashMap<String, Arc<Statement>>,
}

impl Interpreter {
    /// Create an interpreter with no variables
    pub fn new() -> Self {
        Self::default()
    }

    fn statement(&mut self, source: &str) -> ScriptResult<Arc<Statement>> {
        if let Some(statement) = self.statements.get(source) {
            return Ok(Arc::clone(statement));
        }

        log::trace!("parsing statement: {}", source);
        let statement = Arc::new(parse_statement(source)?);
        self.statements
            .insert(source.to_string(), Arc::clone(&statement));
        Ok(statement)
    }

    /// Evaluate an expression against the current variables
    pub fn evaluate(&self, expr: &Expr) -> ScriptResult<ScriptValue> {
        match expr {
            Expr::Number(n) => Ok(ScriptValue::Number(*n)),
            Expr::String(s) => Ok(ScriptValue::String(s.clone())),
            Expr::Boolean(b) => Ok(ScriptValue::Boolean(*b)),
            Expr::Null => Ok(ScriptValue::Null),

            Expr::Variable(name) => self
                .variables
                .get(name)
                .cloned()
                .ok_or_else(|| ScriptError::UndefinedVariable(name.clone())),

            Expr::BinaryOp { op, left, right } => self.evaluate_binary_op(*op, left, right),

            Expr::UnaryOp { op, operand } => {
                let value = self.evaluate(operand)?;
                match op {
                    UnaryOperator::Negate => Ok(ScriptValue::Number(-value.to_number()?)),
                    UnaryOperator::Plus => Ok(ScriptValue::Number(value.to_number()?)),
                    UnaryOperator::Not => Ok(ScriptValue::Boolean(!value.is_truthy())),
                }
            }

            Expr::Function { name, args } => self.evaluate_function(name, args),
        }
    }

    fn evaluate_binary_op(
        &self,
        op: BinaryOperator,
        left: &Expr,
        right: &Expr,
    ) -> ScriptResult<ScriptValue> {
        let l = self.evaluate(left)?;
        // The right operand is evaluated on demand so && and || short-circuit
        let r = || self.evaluate(right);

        match op {
            BinaryOperator::And => Ok(ScriptValue::Boolean(l.is_truthy() && r()?.is_truthy())),
            BinaryOperator::Or => Ok(ScriptValue::Boolean(l.is_truthy() || r()?.is_truthy())),

            BinaryOperator::Add => add(&l, &r()?),
            BinaryOperator::Subtract => subtract(&l, &r()?),
            BinaryOperator::Multiply => Ok(ScriptValue::Number(l.to_number()? * r()?.to_number()?)),
            BinaryOperator::Divide => {
                let divisor = r()?.to_number()?;
                if divisor == 0.0 {
                    return Err(ScriptError::DivisionByZero);
                }
                Ok(ScriptValue::Number(l.to_number()? / divisor))
            }
            BinaryOperator::Modulo => {
                let divisor = r()?.to_number()?;
                if divisor == 0.0 {
                    return Err(ScriptError::DivisionByZero);
                }
                Ok(ScriptValue::Number(l.to_number()? % divisor))
            }
            BinaryOperator::Power => {
                Ok(ScriptValue::Number(l.to_number()?.powf(r()?.to_number()?)))
            }

            BinaryOperator::Concat => Ok(ScriptValue::String(l.as_string() + &r()?.as_string())),

            BinaryOperator::Equal => Ok(ScriptValue::Boolean(values_equal(&l, &r()?))),
            BinaryOperator::NotEqual => Ok(ScriptValue::Boolean(!values_equal(&l, &r()?))),
            BinaryOperator::LessThan => Ok(ScriptValue::Boolean(compare_values(&l, &r()?)?.is_lt())),
            BinaryOperator::LessEqual => {
                Ok(ScriptValue::Boolean(compare_values(&l, &r()?)?.is_le()))
            }
            BinaryOperator::GreaterThan => {
                Ok(ScriptValue::Boolean(compare_values(&l, &r()?)?.is_gt()))
            }
            BinaryOperator::GreaterEqual => {
                Ok(ScriptValue::Boolean(compare_values(&l, &r()?)?.is_ge()))
            }
        }
    }

    fn evaluate_function(&self, name: &str, args: &[Expr]) -> ScriptResult<ScriptValue> {
        // IF only evaluates the branch it takes
        if name == "IF" {
            check_arity(name, 2, Some(3), args.len())?;
            return if self.evaluate(&args[0])?.is_truthy() {
                self.evaluate(&args[1])
            } else {
                args.get(2)
                    .map(|e| self.evaluate(e))
                    .unwrap_or(Ok(ScriptValue::Boolean(false)))
            };
        }

        let func = functions::registry()
            .get(name)
            .ok_or_else(|| ScriptError::UnknownFunction(name.to_string()))?;

        check_arity(name, func.min_args, func.max_args, args.len())?;

        let evaluated = args
            .iter()
            .map(|arg| self.evaluate(arg))
            .collect::<ScriptResult<Vec<_>>>()?;

        (func.implementation)(&evaluated)
    }
}

impl ScriptEngine for Interpreter {
    fn set(&mut self, name: &str, value: ScriptValue) {
        self.variables.insert(name.to_string(), value);
    }

    fn eval(&mut self, source: &str) -> ScriptResult<ScriptValue> {
        let statement = self.statement(source)?;
        match statement.as_ref() {
            Statement::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.variables.insert(name.clone(), value.clone());
                Ok(value)
            }
            Statement::Expr(expr) => self.evaluate(expr),
        }
    }

    fn get(&self, name: &str) -> Option<&ScriptValue> {
        self.variables.get(name)
    }

    /// Parsed statements stay cached
    fn clear(&mut self) {
        self.variables.clear();
    }
}

/// `+`: text concatenation when either side is text, date shifting, else numeric
fn add(l: &ScriptValue, r: &ScriptValue) -> ScriptResult<ScriptValue> {
    match (l, r) {
        (ScriptValue::String(_), _) | (_, ScriptValue::String(_)) => {
            Ok(ScriptValue::String(l.as_string() + &r.as_string()))
        }
        (ScriptValue::Date(d), ScriptValue::Number(n))
        | (ScriptValue::Number(n), ScriptValue::Date(d)) => shift_days(d, *n),
        _ => Ok(ScriptValue::Number(l.to_number()? + r.to_number()?)),
    }
}

fn subtract(l: &ScriptValue, r: &ScriptValue) -> ScriptResult<ScriptValue> {
    match (l, r) {
        (ScriptValue::Date(a), ScriptValue::Date(b)) => Ok(ScriptValue::Number(
            a.signed_duration_since(*b).num_milliseconds() as f64 / MILLIS_PER_DAY,
        )),
        (ScriptValue::Date(d), ScriptValue::Number(n)) => shift_days(d, -n),
        _ => Ok(ScriptValue::Number(l.to_number()? - r.to_number()?)),
    }
}

fn shift_days(date: &NaiveDateTime, days: f64) -> ScriptResult<ScriptValue> {
    let millis = (days * MILLIS_PER_DAY).round();
    // Outside this range the cast saturates and chrono rejects the delta
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return Err(ScriptError::Argument(format!("cannot shift a date by {} days", days)));
    }
    Duration::try_milliseconds(millis as i64)
        .and_then(|delta| date.checked_add_signed(delta))
        .map(ScriptValue::Date)
        .ok_or_else(|| ScriptError::Argument("date out of range".into()))
}

fn values_equal(l: &ScriptValue, r: &ScriptValue) -> bool {
    match (l, r) {
        (ScriptValue::Null, ScriptValue::Null) => true,
        (ScriptValue::Number(a), ScriptValue::Number(b)) => a == b,
        (ScriptValue::String(a), ScriptValue::String(b)) => a == b,
        (ScriptValue::Boolean(a), ScriptValue::Boolean(b)) => a == b,
        (ScriptValue::Date(a), ScriptValue::Date(b)) => a == b,
        (ScriptValue::Number(n), s @ ScriptValue::String(_))
        | (s @ ScriptValue::String(_), ScriptValue::Number(n)) => s.as_number() == Some(*n),
        _ => false,
    }
}

fn compare_values(l: &ScriptValue, r: &ScriptValue) -> ScriptResult<Ordering> {
    let ordering = match (l, r) {
        (ScriptValue::String(a), ScriptValue::String(b)) => Some(a.cmp(b)),
        (ScriptValue::Boolean(a), ScriptValue::Boolean(b)) => Some(a.cmp(b)),
        (ScriptValue::Date(a), ScriptValue::Date(b)) => Some(a.cmp(b)),
        (ScriptValue::Date(_), _) | (_, ScriptValue::Date(_)) => None,
        _ => match (l.as_number(), r.as_number()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
    };

    ordering.ok_or_else(|| {
        ScriptError::type_error(format!(
            "cannot compare {} with {}",
            l.type_name(),
            r.type_name()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn eval(source: &str) -> ScriptResult<ScriptValue> {
        Interpreter::new().eval(source)
    }

    fn num(n: f64) -> ScriptValue {
        ScriptValue::Number(n)
    }

    #[test]
    fn test_evaluate_arithmetic() {
        assert_eq!(eval("1+2").unwrap(), num(3.0));
        assert_eq!(eval("10-3").unwrap(), num(7.0));
        assert_eq!(eval("4*5").unwrap(), num(20.0));
        assert_eq!(eval("20/4").unwrap(), num(5.0));
        assert_eq!(eval("7%3").unwrap(), num(1.0));
        assert_eq!(eval("2^10").unwrap(), num(1024.0));
        assert_eq!(eval("-(2+3)").unwrap(), num(-5.0));
    }

    #[test]
    fn test_evaluate_precedence() {
        assert_eq!(eval("1+2*3").unwrap(), num(7.0));
        assert_eq!(eval("(1+2)*3").unwrap(), num(9.0));
        assert_eq!(eval("2^3^2").unwrap(), num(512.0));
    }

    #[test]
    fn test_plus_concatenates_text() {
        assert_eq!(eval("\"B\" + \"B\"").unwrap(), ScriptValue::from("BB"));
        assert_eq!(eval("\"n\" + 1").unwrap(), ScriptValue::from("n1"));
        assert_eq!(eval("1 & 2").unwrap(), ScriptValue::from("12"));
        assert_eq!(eval("true + 1").unwrap(), num(2.0));
    }

    #[test]
    fn test_numeric_text_coerces_for_other_operators() {
        assert_eq!(eval("\"3\" * 2").unwrap(), num(6.0));
        assert!(matches!(eval("\"x\" * 2"), Err(ScriptError::Type(_))));
    }

    #[test]
    fn test_division_by_zero_fails() {
        assert_eq!(eval("1/0"), Err(ScriptError::DivisionByZero));
        assert_eq!(eval("1%0"), Err(ScriptError::DivisionByZero));
    }

    #[test]
    fn test_comparison_and_logic() {
        assert_eq!(eval("1 < 2").unwrap(), ScriptValue::Boolean(true));
        assert_eq!(eval("\"a\" < \"b\"").unwrap(), ScriptValue::Boolean(true));
        assert_eq!(eval("1 == \"1\"").unwrap(), ScriptValue::Boolean(true));
        assert_eq!(eval("1 <> 1").unwrap(), ScriptValue::Boolean(false));
        assert_eq!(eval("null == null").unwrap(), ScriptValue::Boolean(true));
        assert_eq!(eval("true && !false").unwrap(), ScriptValue::Boolean(true));
        assert_eq!(eval("false || 0").unwrap(), ScriptValue::Boolean(false));
        assert!(eval("\"a\" < 1").is_err());
    }

    #[test]
    fn test_logical_operators_short_circuit() {
        assert_eq!(eval("false && 1/0").unwrap(), ScriptValue::Boolean(false));
        assert_eq!(eval("true || missing").unwrap(), ScriptValue::Boolean(true));
    }

    #[test]
    fn test_if_is_lazy() {
        let mut engine = Interpreter::new();
        engine.set("x", num(0.0));
        assert_eq!(engine.eval("IF(x == 0, 0, 1/x)").unwrap(), num(0.0));
        assert_eq!(engine.eval("if(x, 1)").unwrap(), ScriptValue::Boolean(false));
        assert!(matches!(
            engine.eval("IF(x)"),
            Err(ScriptError::ArgumentCount { .. })
        ));
    }

    #[test]
    fn test_variables() {
        let mut engine = Interpreter::new();
        engine.set("a", num(2.0));
        assert_eq!(engine.eval("b = a * 3").unwrap(), num(6.0));
        assert_eq!(engine.get("b"), Some(&num(6.0)));
        assert_eq!(
            engine.eval("c + 1"),
            Err(ScriptError::UndefinedVariable("c".into()))
        );

        engine.clear();
        assert_eq!(engine.get("a"), None);
    }

    #[test]
    fn test_statement_cache() {
        let mut engine = Interpreter::new();
        for i in 0..3 {
            engine.set("x", num(i as f64));
            assert_eq!(engine.eval("x * 2").unwrap(), num(i as f64 * 2.0));
        }
        assert_eq!(engine.statements.len(), 1);
    }

    #[test]
    fn test_date_arithmetic() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut engine = Interpreter::new();
        engine.set("d", ScriptValue::Date(d));

        let next = engine.eval("d + 1").unwrap();
        assert_eq!(
            next,
            ScriptValue::Date(d + Duration::days(1))
        );
        assert_eq!(engine.eval("(d + 1.5) - d").unwrap(), num(1.5));
        assert_eq!(engine.eval("d < d + 1").unwrap(), ScriptValue::Boolean(true));
    }

    #[test]
    fn test_date_shift_out_of_range() {
        let mut engine = Interpreter::new();
        let d = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        engine.set("d", ScriptValue::Date(d));

        for source in ["d - 10^300", "d + 10^300", "d - 10^15", "d + 10^6", "DATE(2024, 1, 1) - 10^300"] {
            assert!(
                matches!(engine.eval(source), Err(ScriptError::Argument(_))),
                "{} should fail",
                source
            );
        }
    }

    #[test]
    fn test_unknown_function() {
        assert_eq!(
            eval("NOPE(1)"),
            Err(ScriptError::UnknownFunction("NOPE".into()))
        );
    }
}
