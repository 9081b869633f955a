//! The variable-store-plus-evaluator capability

use crate::error::ScriptResult;
use crate::value::ScriptValue;

/// A variable store that can evaluate statements against its contents
///
/// This is all the column transformer needs from an expression language;
/// any implementation is substitutable.
pub trait ScriptEngine {
    /// Bind `name` to `value`, replacing any previous binding
    fn set(&mut self, name: &str, value: ScriptValue);

    /// Evaluate a statement and return its value
    ///
    /// For an assignment the assigned value is returned.
    fn eval(&mut self, source: &str) -> ScriptResult<ScriptValue>;

    /// Current binding of `name`
    fn get(&self, name: &str) -> Option<&ScriptValue>;

    /// Drop every binding
    fn clear(&mut self);
}

impl<E: ScriptEngine + ?Sized> ScriptEngine for Box<E> {
    fn set(&mut self, name: &str, value: ScriptValue) {
        (**self).set(name, value)
    }

    fn eval(&mut self, source: &str) -> ScriptResult<ScriptValue> {
        (**self).eval(source)
    }

    fn get(&self, name: &str) -> Option<&ScriptValue> {
        (**self).get(name)
    }

    fn clear(&mut self) {
        (**self).clear()
    }
}
